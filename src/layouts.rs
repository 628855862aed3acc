//! Declarative descriptions of the scraped page layouts
//!
//! Column positions and unit suffixes belong to the upstream page markup, not to
//! the extraction code. They live here as serde types so a layout change can be
//! absorbed with a JSON file (`LAYOUT_FILE`) instead of a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Where a field lives in a table row and which unit markers to strip from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub index: usize,
    #[serde(default)]
    pub strip: Vec<String>,
}

impl ColumnSpec {
    pub fn new(index: usize, strip: &[&str]) -> Self {
        Self {
            index,
            strip: strip.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Cell text with every unit marker removed and surrounding whitespace trimmed.
    /// `None` when the row has no cell at `index`.
    pub fn clean(&self, cells: &[String]) -> Option<String> {
        let mut text = cells.get(self.index)?.clone();
        for marker in &self.strip {
            text = text.replace(marker.as_str(), "");
        }
        Some(text.trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationLayout {
    /// Element holding the page's display date
    pub date_selector: String,
    pub row_selector: String,
    pub min_cells: usize,
    pub time: ColumnSpec,
    pub temperature: ColumnSpec,
    pub humidity: ColumnSpec,
}

impl Default for ObservationLayout {
    fn default() -> Self {
        Self {
            date_selector: ".date-text strong".to_string(),
            row_selector: ".history-table.desktop-table tbody tr".to_string(),
            min_cells: 4,
            time: ColumnSpec::new(0, &[]),
            temperature: ColumnSpec::new(1, &["°F"]),
            humidity: ColumnSpec::new(3, &["%", "°"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLayout {
    /// Selector that must match before a rendered page is considered ready
    pub ready_selector: String,
    pub row_selector: String,
    pub min_cells: usize,
    pub time: ColumnSpec,
    pub temperature: ColumnSpec,
    pub precipitation: ColumnSpec,
    pub humidity: ColumnSpec,
}

impl Default for ForecastLayout {
    fn default() -> Self {
        Self {
            ready_selector: "#hourly-forecast-table tbody tr".to_string(),
            row_selector: "#hourly-forecast-table tbody tr".to_string(),
            min_cells: 4,
            time: ColumnSpec::new(0, &[]),
            temperature: ColumnSpec::new(2, &["°F", "°"]),
            precipitation: ColumnSpec::new(4, &["%"]),
            humidity: ColumnSpec::new(8, &["%", "°"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayouts {
    #[serde(default)]
    pub observation: ObservationLayout,
    #[serde(default)]
    pub forecast: ForecastLayout,
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Failed to read layout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid layout file: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageLayouts {
    /// Load layouts from a JSON file. Sections missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let layouts: PageLayouts = serde_json::from_str(&contents)?;
        info!("Loaded page layouts from {}", path.display());
        Ok(layouts)
    }
}
