/// Station daily observation table
///
/// The page shows one display date in a heading and one row per reading below it.
/// Rows whose temperature or humidity cell does not parse are dropped; that is
/// routine on these pages (blank readings, separator rows) and not an error.
use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::extract::{body_rows, parse_decimal, parse_integer, selector};
use crate::layouts::ObservationLayout;
use crate::models::ObservationRow;
use crate::parse_error::ParseError;
use crate::time_normalizer::{normalize_date, parse_observation_time};

pub struct ObservationTable<'l> {
    document: Html,
    layout: &'l ObservationLayout,
    date_selector: Selector,
    row_selector: Selector,
}

impl<'l> ObservationTable<'l> {
    #[instrument(skip(html, layout), fields(html_size = html.len()))]
    pub fn parse(html: &str, layout: &'l ObservationLayout) -> Result<Self, ParseError> {
        Ok(Self {
            document: Html::parse_document(html),
            layout,
            date_selector: selector(&layout.date_selector)?,
            row_selector: selector(&layout.row_selector)?,
        })
    }

    /// Calendar date the table covers, read from the first date heading.
    pub fn scraped_date(&self) -> Result<NaiveDate, ParseError> {
        let heading = self
            .document
            .select(&self.date_selector)
            .next()
            .ok_or_else(|| ParseError::MissingElement(self.layout.date_selector.clone()))?;
        let text = heading.text().collect::<String>();
        normalize_date(text.trim())
    }

    /// Lazily yield every valid row, timestamped `date` + the row's time of day.
    pub fn rows<'a>(
        &'a self,
        station_id: &'a str,
        date: NaiveDate,
    ) -> impl Iterator<Item = ObservationRow> + 'a {
        body_rows(&self.document, &self.row_selector, self.layout.min_cells).filter_map(
            move |(row_number, cells)| match parse_row(self.layout, station_id, date, &cells) {
                Ok(row) => Some(row),
                Err(e) => {
                    debug!("Dropping observation row {}: {} ({:?})", row_number, e, cells);
                    None
                }
            },
        )
    }
}

fn parse_row(
    layout: &ObservationLayout,
    station_id: &str,
    date: NaiveDate,
    cells: &[String],
) -> Result<ObservationRow, ParseError> {
    let field = |spec: &crate::layouts::ColumnSpec| {
        spec.clean(cells)
            .ok_or_else(|| ParseError::MissingElement(format!("cell {}", spec.index)))
    };

    let temperature = parse_decimal(&field(&layout.temperature)?)?;
    let humidity = parse_integer(&field(&layout.humidity)?)?;
    let time = parse_observation_time(&field(&layout.time)?)?;

    Ok(ObservationRow {
        station_id: station_id.to_string(),
        timestamp: date.and_time(time),
        temperature,
        humidity,
    })
}
