use chrono::{NaiveDate, NaiveDateTime};

/// One timestamped temperature/humidity reading scraped from a station's daily table.
///
/// Rows are only built when both the temperature and the humidity cell parsed,
/// so neither field is optional here.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: i32,
}

impl ObservationRow {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// One predicted hour from the hourly forecast page.
///
/// `run_timestamp` is midnight of the day the forecast batch was collected and is
/// shared by every row of that batch. `precip` may be NaN when the cell was blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub run_timestamp: NaiveDateTime,
    pub forecast_date: NaiveDateTime,
    pub temp: f64,
    pub precip: f64,
    pub humidity: i32,
    /// Set when the time cell did not match and `00:00` was substituted.
    pub clock_fallback: bool,
}

/// Difference between the two stations' readings at an identical timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub timestamp: NaiveDateTime,
    pub station_1_temp: f64,
    pub station_2_temp: f64,
    pub temp_difference: f64,
    pub station_1_humidity: i32,
    pub station_2_humidity: i32,
    pub humidity_difference: i32,
}
