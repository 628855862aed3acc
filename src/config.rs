use chrono::NaiveDate;
use std::env;
use std::time::Duration;

const DEFAULT_OBSERVATION_URL_TEMPLATE: &str =
    "https://www.wunderground.com/dashboard/pws/{station}/table/{date}/{date}/daily";
const DEFAULT_FORECAST_URL_TEMPLATE: &str =
    "https://www.wunderground.com/hourly/us/wa/blaine/48.99,-122.75/date/{date}";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub station_1_id: String,
    pub station_2_id: String,
    pub observation_url_template: String,
    pub forecast_url_template: String,
    pub forecast_days: u32,
    pub render_timeout_ms: u64,
    pub render_poll_interval_ms: u64,
    pub render_endpoint: Option<String>,
    pub user_agent: String,
    pub layout_file: Option<String>,
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Replace `{station}` and `{date}` (ISO `YYYY-MM-DD`) in a URL template.
pub fn fill_template(template: &str, station_id: &str, date: NaiveDate) -> String {
    template
        .replace("{station}", station_id)
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
}

impl Config {
    /// `DATABASE_URL` is optional here; the binary insists on it unless running dry.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 5),
            station_1_id: env::var("STATION_1_ID").unwrap_or_else(|_| "KWABLAIN153".to_string()),
            station_2_id: env::var("STATION_2_ID").unwrap_or_else(|_| "KWABLAIN126".to_string()),
            observation_url_template: env::var("OBSERVATION_URL_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_OBSERVATION_URL_TEMPLATE.to_string()),
            forecast_url_template: env::var("FORECAST_URL_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_FORECAST_URL_TEMPLATE.to_string()),
            forecast_days: parsed_or("FORECAST_DAYS", 10),
            render_timeout_ms: parsed_or("RENDER_TIMEOUT_MS", 20_000),
            render_poll_interval_ms: parsed_or("RENDER_POLL_INTERVAL_MS", 1_000),
            render_endpoint: env::var("RENDER_ENDPOINT").ok(),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            layout_file: env::var("LAYOUT_FILE").ok(),
        })
    }

    pub fn database_url(&self) -> Result<&str, env::VarError> {
        self.database_url.as_deref().ok_or(env::VarError::NotPresent)
    }

    pub fn observation_url(&self, station_id: &str, date: NaiveDate) -> String {
        fill_template(&self.observation_url_template, station_id, date)
    }

    pub fn forecast_url(&self, date: NaiveDate) -> String {
        fill_template(&self.forecast_url_template, "", date)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn render_poll_interval(&self) -> Duration {
        Duration::from_millis(self.render_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const NUMERIC_KEYS: [&str; 4] = [
        "DB_MAX_CONNECTIONS",
        "FORECAST_DAYS",
        "RENDER_TIMEOUT_MS",
        "RENDER_POLL_INTERVAL_MS",
    ];

    fn clear_numeric_env() {
        for key in NUMERIC_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        clear_numeric_env();
        env::set_var("FORECAST_DAYS", "abc");
        env::set_var("RENDER_TIMEOUT_MS", "");
        env::set_var("DB_MAX_CONNECTIONS", "-1");

        let config = Config::from_env().unwrap();
        clear_numeric_env();

        assert_eq!(config.forecast_days, 10);
        assert_eq!(config.render_timeout_ms, 20_000);
        assert_eq!(config.render_timeout(), Duration::from_secs(20));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.render_poll_interval_ms, 1_000);
    }

    #[test]
    #[serial]
    fn test_numeric_overrides_are_read() {
        clear_numeric_env();
        env::set_var("FORECAST_DAYS", "3");
        env::set_var("RENDER_TIMEOUT_MS", "500");

        let config = Config::from_env().unwrap();
        clear_numeric_env();

        assert_eq!(config.forecast_days, 3);
        assert_eq!(config.render_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_fill_template() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            fill_template(DEFAULT_OBSERVATION_URL_TEMPLATE, "KWABLAIN153", date),
            "https://www.wunderground.com/dashboard/pws/KWABLAIN153/table/2024-06-01/2024-06-01/daily"
        );
        assert_eq!(
            fill_template(DEFAULT_FORECAST_URL_TEMPLATE, "", date),
            "https://www.wunderground.com/hourly/us/wa/blaine/48.99,-122.75/date/2024-06-01"
        );
    }
}
