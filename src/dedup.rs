/// Re-run guard for the batch job
///
/// Storage has no row-level upsert, so these pre-checks are what keeps a second
/// run on the same day from appending the same data again: a station's day is
/// collected once, and a forecast run (keyed by its midnight timestamp) once.
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, instrument};

use crate::db::{DbError, ForecastStore, ObservationStore};

#[derive(Clone)]
pub struct DedupGuard<S> {
    store: S,
}

impl<S> DedupGuard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ObservationStore> DedupGuard<S> {
    #[instrument(skip(self))]
    pub async fn observation_exists(&self, station_id: &str, date: NaiveDate) -> Result<bool, DbError> {
        let exists = self.store.observation_exists(station_id, date).await?;
        if exists {
            info!("Data for {} on {} already exists, skipping", station_id, date);
        }
        Ok(exists)
    }
}

impl<S: ForecastStore> DedupGuard<S> {
    #[instrument(skip(self))]
    pub async fn forecast_run_exists(&self, run_timestamp: NaiveDateTime) -> Result<bool, DbError> {
        let exists = self.store.forecast_run_exists(run_timestamp).await?;
        if exists {
            info!("Forecast run {} already exists, skipping collection", run_timestamp);
        }
        Ok(exists)
    }
}
