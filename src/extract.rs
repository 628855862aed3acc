//! HTML table extraction
//!
//! Both page types share the same row walk: select body rows, collect the text of
//! each `td`, skip rows shorter than the layout's minimum. Field parsing is then
//! driven by the page's [`crate::layouts`] column specs.

pub mod forecast_table;
pub mod observation_table;

pub use forecast_table::ForecastTable;
pub use observation_table::ObservationTable;

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::parse_error::ParseError;

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

fn cell_selector() -> Selector {
    // Literal selector, cannot fail
    Selector::parse("td").expect("valid td selector")
}

/// Cell texts of a row with inner whitespace collapsed to single spaces.
pub(crate) fn cell_texts(row: ElementRef<'_>, cells: &Selector) -> Vec<String> {
    row.select(cells)
        .map(|cell| {
            cell.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Lazily walk the rows matched by `rows`, yielding `(row_number, cells)` for every
/// row that has at least `min_cells` cells.
pub(crate) fn body_rows<'a>(
    document: &'a Html,
    rows: &'a Selector,
    min_cells: usize,
) -> impl Iterator<Item = (usize, Vec<String>)> + 'a {
    let cells = cell_selector();
    document
        .select(rows)
        .enumerate()
        .filter_map(move |(idx, row)| {
            let texts = cell_texts(row, &cells);
            if texts.len() < min_cells {
                debug!(
                    "Row {} has {} cells (need {}), skipping",
                    idx + 1,
                    texts.len(),
                    min_cells
                );
                return None;
            }
            Some((idx + 1, texts))
        })
}

fn leading_decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid regex")
    })
}

fn leading_integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid regex"))
}

/// Parse the leading decimal of a cell ("61.2 °" reads as 61.2). A cell that does
/// not start with a number is rejected, as are blanks and dashes.
pub(crate) fn parse_decimal(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    let number = leading_decimal_re()
        .find(trimmed)
        .ok_or_else(|| ParseError::Number(format!("'{}' is not a number", text)))?;
    let value = number
        .as_str()
        .parse::<f64>()
        .map_err(|e| ParseError::Number(format!("'{}': {}", text, e)))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::Number(format!("'{}' is not finite", text)))
    }
}

/// Parse the leading integer of a cell ("92 °" reads as 92, "40.5" as 40).
pub(crate) fn parse_integer(text: &str) -> Result<i32, ParseError> {
    let trimmed = text.trim();
    let digits = leading_integer_re()
        .find(trimmed)
        .ok_or_else(|| ParseError::Number(format!("'{}' is not an integer", text)))?;
    digits
        .as_str()
        .parse::<i32>()
        .map_err(|e| ParseError::Number(format!("'{}': {}", text, e)))
}
