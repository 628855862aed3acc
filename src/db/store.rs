//! Storage seams used by the collectors, the dedup guard and the comparison engine.
//!
//! Postgres ([`crate::db::PgStore`]) and memory ([`crate::db::MemoryStore`]) both
//! implement these. All three targets are append-only.

use std::future::Future;

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::DbError;
use crate::models::{ComparisonRecord, ForecastRow, ObservationRow};

pub trait ObservationStore: Send + Sync {
    /// True when at least one row exists for `station_id` on calendar day `date`.
    fn observation_exists(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Append all rows as one unit; returns the number written.
    fn insert_observations(
        &self,
        rows: &[ObservationRow],
    ) -> impl Future<Output = Result<usize, DbError>> + Send;

    /// Rows for `station_id` on `date`, in insertion order.
    fn find_observations(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<ObservationRow>, DbError>> + Send;
}

pub trait ForecastStore: Send + Sync {
    /// True when at least one forecast row carries exactly `run_timestamp`.
    fn forecast_run_exists(
        &self,
        run_timestamp: NaiveDateTime,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn insert_forecasts(
        &self,
        rows: &[ForecastRow],
    ) -> impl Future<Output = Result<usize, DbError>> + Send;
}

pub trait ComparisonStore: Send + Sync {
    fn insert_comparisons(
        &self,
        records: &[ComparisonRecord],
    ) -> impl Future<Output = Result<usize, DbError>> + Send;
}
