use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::models::ObservationRow;

// Database entity models
#[derive(Debug, Clone, FromRow)]
pub struct StoredObservation {
    pub id: i64,
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: i32,
}

impl From<StoredObservation> for ObservationRow {
    fn from(stored: StoredObservation) -> Self {
        ObservationRow {
            station_id: stored.station_id,
            timestamp: stored.timestamp,
            temperature: stored.temperature,
            humidity: stored.humidity,
        }
    }
}
