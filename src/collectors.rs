pub mod forecast_collector;
pub mod station_collector;

pub use forecast_collector::ForecastCollector;
pub use station_collector::StationCollector;

use crate::db::DbError;
use crate::fetch_error::FetchError;
use crate::parse_error::ParseError;

/// Failure of one unit of collection work (a station page or a forecast date).
///
/// Collectors log these and carry on with an empty result for that unit.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] DbError),
}
