use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use crate::db::store::{ComparisonStore, ForecastStore, ObservationStore};
use crate::db::DbError;
use crate::models::{ComparisonRecord, ForecastRow, ObservationRow};

#[derive(Default)]
struct Tables {
    observations: Vec<ObservationRow>,
    forecasts: Vec<ForecastRow>,
    comparisons: Vec<ComparisonRecord>,
}

/// In-memory append-only store used for `--dry-run` and in tests.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn observations(&self) -> Vec<ObservationRow> {
        self.tables.lock().await.observations.clone()
    }

    pub async fn forecasts(&self) -> Vec<ForecastRow> {
        self.tables.lock().await.forecasts.clone()
    }

    pub async fn comparisons(&self) -> Vec<ComparisonRecord> {
        self.tables.lock().await.comparisons.clone()
    }
}

impl ObservationStore for MemoryStore {
    async fn observation_exists(&self, station_id: &str, date: NaiveDate) -> Result<bool, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .observations
            .iter()
            .any(|row| row.station_id == station_id && row.date() == date))
    }

    async fn insert_observations(&self, rows: &[ObservationRow]) -> Result<usize, DbError> {
        let mut tables = self.tables.lock().await;
        tables.observations.extend_from_slice(rows);
        debug!("Stored {} observations in memory", rows.len());
        Ok(rows.len())
    }

    async fn find_observations(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ObservationRow>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .observations
            .iter()
            .filter(|row| row.station_id == station_id && row.date() == date)
            .cloned()
            .collect())
    }
}

impl ForecastStore for MemoryStore {
    async fn forecast_run_exists(&self, run_timestamp: NaiveDateTime) -> Result<bool, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .forecasts
            .iter()
            .any(|row| row.run_timestamp == run_timestamp))
    }

    async fn insert_forecasts(&self, rows: &[ForecastRow]) -> Result<usize, DbError> {
        let mut tables = self.tables.lock().await;
        tables.forecasts.extend_from_slice(rows);
        debug!("Stored {} forecast rows in memory", rows.len());
        Ok(rows.len())
    }
}

impl ComparisonStore for MemoryStore {
    async fn insert_comparisons(&self, records: &[ComparisonRecord]) -> Result<usize, DbError> {
        let mut tables = self.tables.lock().await;
        tables.comparisons.extend_from_slice(records);
        Ok(records.len())
    }
}
