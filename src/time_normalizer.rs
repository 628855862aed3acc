/// Date and clock normalisation for scraped page text
///
/// Station pages label their table with a human-readable date ("June 1, 2024"),
/// observation rows carry a 12-hour clock ("12:04 AM") and forecast rows carry a
/// loosely spaced clock ("12 :00 am"). Everything here turns those strings into
/// chrono values; nothing touches the network or the store.
use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::parse_error::ParseError;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid regex"))
}

fn month_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
        )
        .expect("valid regex")
    })
}

fn day_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b",
        )
        .expect("valid regex")
    })
}

fn us_numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"))
}

fn observation_clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\d{1,2})\s*:\s*(\d{2})(?:\s*:\s*(\d{2}))?\s*([ap])?\.?\s*(?:m\.?)?$")
            .expect("valid regex")
    })
}

fn forecast_clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d{1,2})\s*:?\s*(\d{2})?\s*(am|pm)").expect("valid regex"))
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

fn ymd(text: &str, year: &str, month: u32, day: &str) -> Result<NaiveDate, ParseError> {
    let year: i32 = year.parse().map_err(|_| ParseError::Date(text.to_string()))?;
    let day: u32 = day.parse().map_err(|_| ParseError::Date(text.to_string()))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ParseError::Date(text.to_string()))
}

/// Parse a free-text date label into a calendar date.
///
/// Recognised tokens, in order: ISO `2024-06-01`, month-first `June 1, 2024`
/// (weekday prefixes and ordinals are ignored), day-first `1 June 2024`, and US
/// numeric `6/1/2024`. The first token found wins.
pub fn normalize_date(text: &str) -> Result<NaiveDate, ParseError> {
    if let Some(caps) = iso_date_re().captures(text) {
        let month: u32 = caps[2].parse().map_err(|_| ParseError::Date(text.to_string()))?;
        return ymd(text, &caps[1], month, &caps[3]);
    }

    if let Some(caps) = month_first_re().captures(text) {
        let month = month_number(&caps[1]).ok_or_else(|| ParseError::Date(text.to_string()))?;
        return ymd(text, &caps[3], month, &caps[2]);
    }

    if let Some(caps) = day_first_re().captures(text) {
        let month = month_number(&caps[2]).ok_or_else(|| ParseError::Date(text.to_string()))?;
        return ymd(text, &caps[3], month, &caps[1]);
    }

    if let Some(caps) = us_numeric_re().captures(text) {
        let month: u32 = caps[1].parse().map_err(|_| ParseError::Date(text.to_string()))?;
        return ymd(text, &caps[3], month, &caps[2]);
    }

    debug!("No date token in '{}'", text);
    Err(ParseError::Date(text.to_string()))
}

/// Parse an observation table time cell such as `12:04 AM`, `1:30 pm` or `13:45`.
pub fn parse_observation_time(text: &str) -> Result<NaiveTime, ParseError> {
    let trimmed = text.trim();
    let caps = observation_clock_re()
        .captures(trimmed)
        .ok_or_else(|| ParseError::Clock(trimmed.to_string()))?;

    let hour: u32 = caps[1].parse().map_err(|_| ParseError::Clock(trimmed.to_string()))?;
    let minute: u32 = caps[2].parse().map_err(|_| ParseError::Clock(trimmed.to_string()))?;
    let second: u32 = match caps.get(3) {
        Some(s) => s.as_str().parse().map_err(|_| ParseError::Clock(trimmed.to_string()))?,
        None => 0,
    };

    let hour = match caps.get(4).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(marker) => {
            if !(1..=12).contains(&hour) {
                return Err(ParseError::Clock(trimmed.to_string()));
            }
            to_24_hour(hour, marker == "p")
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| ParseError::Clock(trimmed.to_string()))
}

fn to_24_hour(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// A forecast clock reading together with whether it came from the `00:00` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastClock {
    pub time: NaiveTime,
    pub fallback: bool,
}

impl ForecastClock {
    pub fn hhmm(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Read a forecast time cell (`"12 :00 am"`, `"3pm"`, `"11:59 PM"`).
///
/// Never fails: text with no am/pm clock, an hour outside 1-12 or a minute above 59
/// yields midnight with `fallback` set.
pub fn read_forecast_clock(cell_text: &str) -> ForecastClock {
    let parsed = forecast_clock_re().captures(cell_text).and_then(|caps| {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("pm");
        NaiveTime::from_hms_opt(to_24_hour(hour, pm), minute, 0)
    });

    match parsed {
        Some(time) => ForecastClock {
            time,
            fallback: false,
        },
        None => ForecastClock {
            time: NaiveTime::MIN,
            fallback: true,
        },
    }
}

/// `HH:MM` form of [`read_forecast_clock`]; unmatched text becomes `"00:00"`.
pub fn parse_forecast_clock(cell_text: &str) -> String {
    read_forecast_clock(cell_text).hhmm()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn yesterday() -> NaiveDate {
    today() - Days::new(1)
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Midnight of the current local day; shared run timestamp of a forecast batch.
pub fn midnight_today() -> NaiveDateTime {
    midnight(today())
}

/// The `n` calendar dates after `start`: exclusive of `start`, inclusive of `start + n`.
pub fn add_days(start: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (1..=u64::from(n)).map(|i| start + Days::new(i)).collect()
}

/// Forecast window for a run on `today`: the `n` days following yesterday.
pub fn forecast_window(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    add_days(today - Days::new(1), n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_date_month_name() {
        assert_eq!(normalize_date("June 1, 2024").unwrap(), date(2024, 6, 1));
        assert_eq!(normalize_date("  Sat, Jun 1st, 2024 ").unwrap(), date(2024, 6, 1));
        assert_eq!(normalize_date("Sept. 30 2023").unwrap(), date(2023, 9, 30));
    }

    #[test]
    fn test_normalize_date_other_forms() {
        assert_eq!(normalize_date("2024-06-01").unwrap(), date(2024, 6, 1));
        assert_eq!(normalize_date("1 June 2024").unwrap(), date(2024, 6, 1));
        assert_eq!(normalize_date("6/1/2024").unwrap(), date(2024, 6, 1));
    }

    #[test]
    fn test_normalize_date_without_token_fails() {
        assert!(matches!(normalize_date("Daily Observations"), Err(ParseError::Date(_))));
        assert!(matches!(normalize_date(""), Err(ParseError::Date(_))));
    }

    #[test]
    fn test_normalize_date_impossible_day_fails() {
        assert!(normalize_date("February 30, 2024").is_err());
    }

    #[test]
    fn test_parse_forecast_clock_boundaries() {
        assert_eq!(parse_forecast_clock("12:00am"), "00:00");
        assert_eq!(parse_forecast_clock("12:00pm"), "12:00");
        assert_eq!(parse_forecast_clock("1:00am"), "01:00");
        assert_eq!(parse_forecast_clock("11:59pm"), "23:59");
    }

    #[test]
    fn test_parse_forecast_clock_loose_spacing() {
        assert_eq!(parse_forecast_clock("12 :00 am"), "00:00");
        assert_eq!(parse_forecast_clock("3 PM"), "15:00");
        assert_eq!(parse_forecast_clock("  7 : 30   Am "), "07:30");
    }

    #[test]
    fn test_parse_forecast_clock_fallback() {
        assert_eq!(parse_forecast_clock("garbage"), "00:00");
        assert!(read_forecast_clock("garbage").fallback);
        assert!(read_forecast_clock("13:00 pm").fallback);
        assert!(!read_forecast_clock("12:00 am").fallback);
    }

    #[test]
    fn test_parse_observation_time() {
        assert_eq!(
            parse_observation_time("12:04 AM").unwrap(),
            NaiveTime::from_hms_opt(0, 4, 0).unwrap()
        );
        assert_eq!(
            parse_observation_time("1:30 pm").unwrap(),
            NaiveTime::from_hms_opt(13, 30, 0).unwrap()
        );
        assert_eq!(
            parse_observation_time("13:45").unwrap(),
            NaiveTime::from_hms_opt(13, 45, 0).unwrap()
        );
        assert!(parse_observation_time("garbage row").is_err());
        assert!(parse_observation_time("13:00 PM").is_err());
    }

    #[test]
    fn test_add_days_window() {
        let days = add_days(date(2024, 6, 1), 10);
        assert_eq!(days.len(), 10);
        assert_eq!(days[0], date(2024, 6, 2));
        assert_eq!(days[9], date(2024, 6, 11));
        assert!(days.windows(2).all(|w| w[1] == w[0] + Days::new(1)));
    }

    #[test]
    fn test_add_days_crosses_month_end() {
        let days = add_days(date(2024, 2, 27), 3);
        assert_eq!(days, vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
    }

    #[test]
    fn test_forecast_window_starts_today() {
        let days = forecast_window(date(2024, 6, 2), 10);
        assert_eq!(days.first(), Some(&date(2024, 6, 2)));
        assert_eq!(days.last(), Some(&date(2024, 6, 11)));
    }

    #[test]
    fn test_midnight() {
        assert_eq!(midnight(date(2024, 6, 1)).to_string(), "2024-06-01 00:00:00");
    }
}
