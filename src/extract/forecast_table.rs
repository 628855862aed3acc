/// Hourly forecast table
///
/// One rendered page per forecast date. Temperature and humidity must parse for a
/// row to be kept; precipitation is kept as NaN when its cell is blank or missing.
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use crate::extract::{body_rows, parse_decimal, parse_integer, selector};
use crate::layouts::{ColumnSpec, ForecastLayout};
use crate::models::ForecastRow;
use crate::parse_error::ParseError;
use crate::time_normalizer::read_forecast_clock;

pub struct ForecastTable<'l> {
    document: Html,
    layout: &'l ForecastLayout,
    row_selector: Selector,
}

impl<'l> ForecastTable<'l> {
    #[instrument(skip(html, layout), fields(html_size = html.len()))]
    pub fn parse(html: &str, layout: &'l ForecastLayout) -> Result<Self, ParseError> {
        Ok(Self {
            document: Html::parse_document(html),
            layout,
            row_selector: selector(&layout.row_selector)?,
        })
    }

    /// Lazily yield the rows for `forecast_date`, all tagged with `run_timestamp`.
    pub fn rows<'a>(
        &'a self,
        forecast_date: NaiveDate,
        run_timestamp: NaiveDateTime,
    ) -> impl Iterator<Item = ForecastRow> + 'a {
        body_rows(&self.document, &self.row_selector, self.layout.min_cells).filter_map(
            move |(row_number, cells)| {
                match parse_row(self.layout, forecast_date, run_timestamp, &cells) {
                    Ok(row) => {
                        if row.clock_fallback {
                            warn!(
                                "Forecast row {} for {}: unrecognised time '{}', stored as 00:00",
                                row_number,
                                forecast_date,
                                cells.get(self.layout.time.index).map(String::as_str).unwrap_or("")
                            );
                        }
                        Some(row)
                    }
                    Err(e) => {
                        debug!("Dropping forecast row {}: {} ({:?})", row_number, e, cells);
                        None
                    }
                }
            },
        )
    }
}

fn required(spec: &ColumnSpec, cells: &[String]) -> Result<String, ParseError> {
    spec.clean(cells)
        .ok_or_else(|| ParseError::MissingElement(format!("cell {}", spec.index)))
}

fn parse_row(
    layout: &ForecastLayout,
    forecast_date: NaiveDate,
    run_timestamp: NaiveDateTime,
    cells: &[String],
) -> Result<ForecastRow, ParseError> {
    let temp = parse_decimal(&required(&layout.temperature, cells)?)?;
    let humidity = parse_integer(&required(&layout.humidity, cells)?)?;
    let precip = layout
        .precipitation
        .clean(cells)
        .and_then(|text| parse_decimal(&text).ok())
        .unwrap_or(f64::NAN);

    let clock = read_forecast_clock(&required(&layout.time, cells)?);

    Ok(ForecastRow {
        run_timestamp,
        forecast_date: forecast_date.and_time(clock.time),
        temp,
        precip,
        humidity,
        clock_fallback: clock.fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_normalizer::midnight;

    fn forecast_page(rows: &[&[&str]]) -> String {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
                format!("<tr>{}</tr>", tds)
            })
            .collect();
        format!(
            r#"<table id="hourly-forecast-table"><thead><tr><th>Time</th></tr></thead><tbody>{}</tbody></table>"#,
            body
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    }

    #[test]
    fn test_forecast_rows_parsed() {
        let layout = ForecastLayout::default();
        let html = forecast_page(&[
            &["12 :00 am", "Cloudy", "58 °F", "57 °F", "15 %", "0 in", "0 %", "50 %", "88 %"],
            &["1:00 pm", "Sunny", "71 °F", "71 °F", "5 %", "0 in", "0 %", "40 %", "52 %"],
        ]);
        let table = ForecastTable::parse(&html, &layout).unwrap();
        let run = midnight(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let rows: Vec<_> = table.rows(date(), run).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].forecast_date.to_string(), "2024-06-02 00:00:00");
        assert_eq!(rows[0].temp, 58.0);
        assert_eq!(rows[0].precip, 15.0);
        assert_eq!(rows[0].humidity, 88);
        assert_eq!(rows[0].run_timestamp, run);
        assert!(!rows[0].clock_fallback);
        assert_eq!(rows[1].forecast_date.to_string(), "2024-06-02 13:00:00");
    }

    #[test]
    fn test_blank_precipitation_kept_as_nan() {
        let layout = ForecastLayout::default();
        let html = forecast_page(&[&[
            "3:00 am", "Rain", "55 °", "55 °", "", "0.1 in", "0 %", "90 %", "95 %",
        ]]);
        let table = ForecastTable::parse(&html, &layout).unwrap();
        let rows: Vec<_> = table.rows(date(), midnight(date())).collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].precip.is_nan());
    }

    #[test]
    fn test_humidity_degree_marker_tolerated() {
        let layout = ForecastLayout::default();
        let html = forecast_page(&[&[
            "4:00 am", "Fog", "52 °F", "52 °F", "20 %", "0 in", "0 %", "10 %", "97 °%",
        ]]);
        let table = ForecastTable::parse(&html, &layout).unwrap();
        let rows: Vec<_> = table.rows(date(), midnight(date())).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].humidity, 97);
    }

    #[test]
    fn test_rows_without_humidity_cell_dropped() {
        let layout = ForecastLayout::default();
        let html = forecast_page(&[&["3:00 am", "Rain", "55 °", "55 °", "10 %"]]);
        let table = ForecastTable::parse(&html, &layout).unwrap();
        assert_eq!(table.rows(date(), midnight(date())).count(), 0);
    }

    #[test]
    fn test_unrecognised_clock_flagged() {
        let layout = ForecastLayout::default();
        let html = forecast_page(&[&[
            "noon-ish", "Sunny", "70 °F", "70 °F", "0 %", "0 in", "0 %", "30 %", "45 %",
        ]]);
        let table = ForecastTable::parse(&html, &layout).unwrap();
        let rows: Vec<_> = table.rows(date(), midnight(date())).collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].clock_fallback);
        assert_eq!(rows[0].forecast_date.to_string(), "2024-06-02 00:00:00");
    }
}
