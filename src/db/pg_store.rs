use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use crate::db::store::{ComparisonStore, ForecastStore, ObservationStore};
use crate::db::{ComparisonRepository, DbError, ForecastRepository, ObservationRepository};
use crate::models::{ComparisonRecord, ForecastRow, ObservationRow};

/// Postgres-backed store: one repository per table behind the storage traits.
#[derive(Clone)]
pub struct PgStore {
    observations: ObservationRepository,
    forecasts: ForecastRepository,
    comparisons: ComparisonRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            observations: ObservationRepository::new(pool.clone()),
            forecasts: ForecastRepository::new(pool.clone()),
            comparisons: ComparisonRepository::new(pool),
        }
    }
}

impl ObservationStore for PgStore {
    async fn observation_exists(&self, station_id: &str, date: NaiveDate) -> Result<bool, DbError> {
        self.observations.exists_for_day(station_id, date).await
    }

    async fn insert_observations(&self, rows: &[ObservationRow]) -> Result<usize, DbError> {
        self.observations.insert_rows(rows).await
    }

    async fn find_observations(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ObservationRow>, DbError> {
        let stored = self.observations.find_for_day(station_id, date).await?;
        Ok(stored.into_iter().map(ObservationRow::from).collect())
    }
}

impl ForecastStore for PgStore {
    async fn forecast_run_exists(&self, run_timestamp: NaiveDateTime) -> Result<bool, DbError> {
        self.forecasts.run_exists(run_timestamp).await
    }

    async fn insert_forecasts(&self, rows: &[ForecastRow]) -> Result<usize, DbError> {
        self.forecasts.insert_rows(rows).await
    }
}

impl ComparisonStore for PgStore {
    async fn insert_comparisons(&self, records: &[ComparisonRecord]) -> Result<usize, DbError> {
        self.comparisons.insert_records(records).await
    }
}
