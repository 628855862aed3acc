use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::db::DbError;
use crate::models::ComparisonRecord;

#[derive(Clone)]
pub struct ComparisonRepository {
    pool: PgPool,
}

impl ComparisonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn insert_records(&self, records: &[ComparisonRecord]) -> Result<usize, DbError> {
        debug!("Beginning transaction to insert {} comparisons", records.len());
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO weather_comparisons (
                    timestamp,
                    station_1_temp, station_2_temp, temp_difference,
                    station_1_humidity, station_2_humidity, humidity_difference
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.timestamp)
            .bind(record.station_1_temp)
            .bind(record.station_2_temp)
            .bind(record.temp_difference)
            .bind(record.station_1_humidity)
            .bind(record.station_2_humidity)
            .bind(record.humidity_difference)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert comparison at {}: {}", record.timestamp, e);
                e
            })?;
        }

        tx.commit().await?;
        info!("Inserted {} comparisons", records.len());
        Ok(records.len())
    }
}
