use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::db::DbError;
use crate::models::ForecastRow;

#[derive(Clone)]
pub struct ForecastRepository {
    pool: PgPool,
}

impl ForecastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn run_exists(&self, run_timestamp: NaiveDateTime) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM forecasts WHERE timestamp = $1)",
        )
        .bind(run_timestamp)
        .fetch_one(&self.pool)
        .await?;

        debug!("Forecast run {} exists: {}", run_timestamp, exists);
        Ok(exists)
    }

    /// Insert a whole forecast run in one transaction
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn insert_rows(&self, rows: &[ForecastRow]) -> Result<usize, DbError> {
        debug!("Beginning transaction to insert {} forecast rows", rows.len());
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO forecasts (timestamp, forecast_date, temp, precip, humidity, clock_fallback)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.run_timestamp)
            .bind(row.forecast_date)
            .bind(row.temp)
            .bind(row.precip)
            .bind(row.humidity)
            .bind(row.clock_fallback)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert forecast for {}: {}", row.forecast_date, e);
                e
            })?;
        }

        tx.commit().await?;
        info!("Inserted {} forecast rows", rows.len());
        Ok(rows.len())
    }
}
