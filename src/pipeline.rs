use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::{error, info, instrument, warn};

use crate::collectors::{ForecastCollector, StationCollector};
use crate::comparison::ComparisonEngine;
use crate::config::{fill_template, Config};
use crate::db::{ComparisonStore, ForecastStore, ObservationStore};
use crate::layouts::PageLayouts;
use crate::models::{ForecastRow, ObservationRow};
use crate::page_source::PageSource;
use crate::time_normalizer::midnight;

/// What the batch run does; built from [`Config`] plus command-line flags.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub station_1_id: String,
    pub station_2_id: String,
    pub observation_url_template: String,
    pub forecast_url_template: String,
    pub forecast_days: u32,
    pub render_timeout: Duration,
    pub layouts: PageLayouts,
    pub skip_observations: bool,
    pub skip_forecast: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, layouts: PageLayouts) -> Self {
        Self {
            station_1_id: config.station_1_id.clone(),
            station_2_id: config.station_2_id.clone(),
            observation_url_template: config.observation_url_template.clone(),
            forecast_url_template: config.forecast_url_template.clone(),
            forecast_days: config.forecast_days,
            render_timeout: config.render_timeout(),
            layouts,
            skip_observations: false,
            skip_forecast: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub station_1_rows: usize,
    pub station_2_rows: usize,
    pub observations_stored: usize,
    pub comparisons_stored: usize,
    pub forecast_rows: usize,
    pub forecasts_stored: usize,
    pub fallback_clocks: usize,
}

/// The run-once job: both stations, the comparison, then the forecast window.
pub struct Pipeline<P, S> {
    stations: StationCollector<P, S>,
    forecasts: ForecastCollector<P, S>,
    comparisons: ComparisonEngine<S>,
    store: S,
    settings: PipelineSettings,
}

impl<P, S> Pipeline<P, S>
where
    P: PageSource + Clone,
    S: ObservationStore + ForecastStore + ComparisonStore + Clone,
{
    pub fn new(source: P, store: S, settings: PipelineSettings) -> Self {
        Self {
            stations: StationCollector::new(
                source.clone(),
                store.clone(),
                settings.layouts.observation.clone(),
            ),
            forecasts: ForecastCollector::new(
                source,
                store.clone(),
                settings.layouts.forecast.clone(),
                settings.forecast_url_template.clone(),
                settings.render_timeout,
            ),
            comparisons: ComparisonEngine::new(store.clone()),
            store,
            settings,
        }
    }

    /// Run everything for `today`, collecting observations for `observation_date`.
    #[instrument(skip(self))]
    pub async fn run(&self, observation_date: NaiveDate, today: NaiveDate) -> RunSummary {
        let mut summary = RunSummary::default();

        if self.settings.skip_observations {
            info!("Skipping observation collection");
        } else {
            self.collect_observations(observation_date, &mut summary).await;
        }

        if self.settings.skip_forecast {
            info!("Skipping forecast collection");
        } else {
            let window_start = today - Days::new(1);
            self.collect_forecasts(midnight(today), window_start, &mut summary)
                .await;
        }

        summary
    }

    #[instrument(skip(self, summary))]
    pub async fn collect_observations(&self, date: NaiveDate, summary: &mut RunSummary) {
        info!("Collecting weather station data...");
        let id_1 = self.settings.station_1_id.as_str();
        let id_2 = self.settings.station_2_id.as_str();
        let url_1 = fill_template(&self.settings.observation_url_template, id_1, date);
        let url_2 = fill_template(&self.settings.observation_url_template, id_2, date);

        let (rows_1, rows_2) = tokio::join!(
            self.stations.collect(&url_1, id_1),
            self.stations.collect(&url_2, id_2)
        );
        summary.station_1_rows = rows_1.len();
        summary.station_2_rows = rows_2.len();

        for (station_id, rows) in [(id_1, &rows_1), (id_2, &rows_2)] {
            summary.observations_stored += self.persist_observations(station_id, rows).await;
        }

        let (Some(first_1), Some(first_2)) = (rows_1.first(), rows_2.first()) else {
            info!("Comparison skipped: not both stations yielded new rows");
            return;
        };
        if first_1.date() != first_2.date() {
            warn!(
                "Stations reported different dates ({} vs {}), comparison skipped",
                first_1.date(),
                first_2.date()
            );
            return;
        }

        summary.comparisons_stored = self.compare_and_store(first_1.date()).await;
    }

    async fn persist_observations(&self, station_id: &str, rows: &[ObservationRow]) -> usize {
        if rows.is_empty() {
            return 0;
        }
        match self.store.insert_observations(rows).await {
            Ok(stored) => {
                info!("Saved {} rows for station {}", stored, station_id);
                stored
            }
            Err(e) => {
                error!("Error saving weather data for {}: {}", station_id, e);
                0
            }
        }
    }

    async fn compare_and_store(&self, date: NaiveDate) -> usize {
        let records = match self
            .comparisons
            .compare(&self.settings.station_1_id, &self.settings.station_2_id, date)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!("Error comparing station rows for {}: {}", date, e);
                return 0;
            }
        };
        if records.is_empty() {
            return 0;
        }

        match self.store.insert_comparisons(&records).await {
            Ok(stored) => {
                info!("Weather comparisons saved for {}", date);
                stored
            }
            Err(e) => {
                error!("Error saving comparisons for {}: {}", date, e);
                0
            }
        }
    }

    #[instrument(skip(self, summary))]
    pub async fn collect_forecasts(
        &self,
        run_timestamp: NaiveDateTime,
        window_start: NaiveDate,
        summary: &mut RunSummary,
    ) {
        info!("Collecting {}-day forecast data...", self.settings.forecast_days);
        let rows: Vec<ForecastRow> = self
            .forecasts
            .collect_run(run_timestamp, window_start, self.settings.forecast_days)
            .await;
        summary.forecast_rows = rows.len();
        summary.fallback_clocks = rows.iter().filter(|row| row.clock_fallback).count();

        if rows.is_empty() {
            return;
        }
        if summary.fallback_clocks > 0 {
            warn!(
                "{} forecast rows used the 00:00 clock fallback",
                summary.fallback_clocks
            );
        }

        match self.store.insert_forecasts(&rows).await {
            Ok(stored) => {
                info!("Hourly forecasts saved: {} rows", stored);
                summary.forecasts_stored = stored;
            }
            Err(e) => error!("Error saving forecast data: {}", e),
        }
    }
}
