use chrono::NaiveDate;
use tracing::{error, info, instrument};

use crate::collectors::CollectError;
use crate::db::ObservationStore;
use crate::dedup::DedupGuard;
use crate::extract::ObservationTable;
use crate::layouts::ObservationLayout;
use crate::models::ObservationRow;
use crate::page_source::PageSource;
use crate::parse_error::ParseError;

/// Fetch, dedup-check and extract one station's daily observation table.
pub struct StationCollector<P, S> {
    source: P,
    guard: DedupGuard<S>,
    layout: ObservationLayout,
}

/// Parse the page once into its display date and every valid row.
///
/// The document is dropped before returning so the collector never holds a
/// non-`Send` `Html` across the dedup lookup.
fn read_page(
    html: &str,
    layout: &ObservationLayout,
    station_id: &str,
) -> Result<(NaiveDate, Vec<ObservationRow>), ParseError> {
    let table = ObservationTable::parse(html, layout)?;
    let date = table.scraped_date()?;
    let rows = table.rows(station_id, date).collect();
    Ok((date, rows))
}

impl<P: PageSource, S: ObservationStore> StationCollector<P, S> {
    pub fn new(source: P, store: S, layout: ObservationLayout) -> Self {
        Self {
            source,
            guard: DedupGuard::new(store),
            layout,
        }
    }

    /// All valid rows on the station page, or nothing when the page's date was
    /// already collected. Failures are logged and yield an empty result.
    pub async fn collect(&self, station_url: &str, station_id: &str) -> Vec<ObservationRow> {
        match self.try_collect(station_url, station_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error scraping station {}: {}", station_id, e);
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn try_collect(
        &self,
        station_url: &str,
        station_id: &str,
    ) -> Result<Vec<ObservationRow>, CollectError> {
        let html = self.source.fetch_html(station_url).await?;
        let (date, rows) = read_page(&html, &self.layout, station_id)?;

        if self.guard.observation_exists(station_id, date).await? {
            return Ok(Vec::new());
        }

        info!("Scraped {} rows for {} on {}", rows.len(), station_id, date);
        Ok(rows)
    }
}
