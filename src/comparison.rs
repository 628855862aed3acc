use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, ObservationStore};
use crate::models::{ComparisonRecord, ObservationRow};

/// Pair station A's rows with station B's rows at identical timestamps.
///
/// Output follows A's order. Rows with no exact match on the other side are left
/// out; nothing is interpolated. A pair whose humidity difference does not fit
/// an `i32` is skipped.
pub fn pair_rows(station_a: &[ObservationRow], station_b: &[ObservationRow]) -> Vec<ComparisonRecord> {
    let by_timestamp: HashMap<NaiveDateTime, &ObservationRow> =
        station_b.iter().map(|row| (row.timestamp, row)).collect();

    station_a
        .iter()
        .filter_map(|a| {
            let b = by_timestamp.get(&a.timestamp)?;
            let Some(humidity_difference) = a.humidity.checked_sub(b.humidity) else {
                warn!(
                    "Humidity difference out of range at {} ({} vs {}), skipping",
                    a.timestamp, a.humidity, b.humidity
                );
                return None;
            };
            Some(ComparisonRecord {
                timestamp: a.timestamp,
                station_1_temp: a.temperature,
                station_2_temp: b.temperature,
                temp_difference: a.temperature - b.temperature,
                station_1_humidity: a.humidity,
                station_2_humidity: b.humidity,
                humidity_difference,
            })
        })
        .collect()
}

/// Builds comparison records from persisted observations.
pub struct ComparisonEngine<S> {
    store: S,
}

impl<S: ObservationStore> ComparisonEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn compare(
        &self,
        station_a_id: &str,
        station_b_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ComparisonRecord>, DbError> {
        let station_a = self.store.find_observations(station_a_id, date).await?;
        let station_b = self.store.find_observations(station_b_id, date).await?;
        debug!(
            "Loaded {} rows for {} and {} rows for {}",
            station_a.len(),
            station_a_id,
            station_b.len(),
            station_b_id
        );

        let records = pair_rows(&station_a, &station_b);
        info!(
            "Paired {} of {} rows for {}",
            records.len(),
            station_a.len(),
            date
        );
        Ok(records)
    }
}
