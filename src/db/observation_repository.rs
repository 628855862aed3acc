use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::db::{DbError, StoredObservation};
use crate::models::ObservationRow;

#[derive(Clone)]
pub struct ObservationRepository {
    pool: PgPool,
}

impl ObservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn exists_for_day(&self, station_id: &str, date: NaiveDate) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM weather_stations
                WHERE station_id = $1 AND CAST(timestamp AS DATE) = $2
            )
            "#,
        )
        .bind(station_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        debug!("Observations for {} on {} exist: {}", station_id, date, exists);
        Ok(exists)
    }

    /// Insert all rows in one transaction so a station's day is never half-written
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn insert_rows(&self, rows: &[ObservationRow]) -> Result<usize, DbError> {
        debug!("Beginning transaction to insert {} observations", rows.len());
        let mut tx = self.pool.begin().await?;

        // Untyped queries so the crate builds without a database or a query cache
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO weather_stations (station_id, timestamp, temperature, humidity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&row.station_id)
            .bind(row.timestamp)
            .bind(row.temperature)
            .bind(row.humidity)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(
                    "Failed to insert observation for {} at {}: {}",
                    row.station_id, row.timestamp, e
                );
                e
            })?;
        }

        tx.commit().await?;
        info!("Inserted {} observations", rows.len());
        Ok(rows.len())
    }

    #[instrument(skip(self))]
    pub async fn find_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<StoredObservation>, DbError> {
        let rows = sqlx::query_as::<_, StoredObservation>(
            r#"
            SELECT id, station_id, timestamp, temperature, humidity
            FROM weather_stations
            WHERE station_id = $1 AND CAST(timestamp AS DATE) = $2
            ORDER BY id
            "#,
        )
        .bind(station_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} observations", rows.len());
        Ok(rows)
    }
}
