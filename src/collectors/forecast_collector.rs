use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{error, info, instrument, warn};

use crate::collectors::CollectError;
use crate::config::fill_template;
use crate::db::ForecastStore;
use crate::dedup::DedupGuard;
use crate::extract::ForecastTable;
use crate::layouts::ForecastLayout;
use crate::models::ForecastRow;
use crate::page_source::PageSource;
use crate::parse_error::ParseError;
use crate::time_normalizer::{add_days, midnight_today};

/// Scrape the hourly forecast for a window of days, one rendered page at a time.
pub struct ForecastCollector<P, S> {
    source: P,
    guard: DedupGuard<S>,
    layout: ForecastLayout,
    url_template: String,
    render_timeout: Duration,
}

fn extract_rows(
    html: &str,
    layout: &ForecastLayout,
    forecast_date: NaiveDate,
    run_timestamp: NaiveDateTime,
) -> Result<Vec<ForecastRow>, ParseError> {
    let table = ForecastTable::parse(html, layout)?;
    let rows = table.rows(forecast_date, run_timestamp).collect();
    Ok(rows)
}

impl<P: PageSource, S: ForecastStore> ForecastCollector<P, S> {
    pub fn new(
        source: P,
        store: S,
        layout: ForecastLayout,
        url_template: impl Into<String>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            source,
            guard: DedupGuard::new(store),
            layout,
            url_template: url_template.into(),
            render_timeout,
        }
    }

    /// Forecast rows for the `num_days` dates after `window_start`, tagged with
    /// today's midnight. Empty when that run was already collected.
    pub async fn collect(&self, window_start: NaiveDate, num_days: u32) -> Vec<ForecastRow> {
        self.collect_run(midnight_today(), window_start, num_days)
            .await
    }

    #[instrument(skip(self))]
    pub async fn collect_run(
        &self,
        run_timestamp: NaiveDateTime,
        window_start: NaiveDate,
        num_days: u32,
    ) -> Vec<ForecastRow> {
        match self.guard.forecast_run_exists(run_timestamp).await {
            Ok(true) => return Vec::new(),
            Ok(false) => {}
            Err(e) => {
                error!("Could not check for forecast run {}: {}", run_timestamp, e);
                return Vec::new();
            }
        }

        let mut all_rows = Vec::new();
        for date in add_days(window_start, num_days) {
            match self.collect_date(date, run_timestamp).await {
                Ok(rows) => {
                    info!("Scraped {} forecast rows for {}", rows.len(), date);
                    all_rows.extend(rows);
                }
                Err(e) => {
                    warn!("Could not collect forecast for {}: {}", date, e);
                }
            }
        }

        info!(
            "Collected {} forecast rows across {} days",
            all_rows.len(),
            num_days
        );
        all_rows
    }

    async fn collect_date(
        &self,
        date: NaiveDate,
        run_timestamp: NaiveDateTime,
    ) -> Result<Vec<ForecastRow>, CollectError> {
        let url = fill_template(&self.url_template, "", date);
        info!("Scraping forecast for {} from {}", date, url);

        let html = self
            .source
            .render_html(&url, &self.layout.ready_selector, self.render_timeout)
            .await?;
        Ok(extract_rows(&html, &self.layout, date, run_timestamp)?)
    }
}
