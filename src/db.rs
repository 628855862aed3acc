pub mod comparison_repository;
pub mod error;
pub mod forecast_repository;
pub mod memory_store;
pub mod models;
pub mod observation_repository;
pub mod pg_store;
pub mod pool;
pub mod store;

pub use comparison_repository::ComparisonRepository;
pub use error::DbError;
pub use forecast_repository::ForecastRepository;
pub use memory_store::MemoryStore;
pub use models::*;
pub use observation_repository::ObservationRepository;
pub use pg_store::PgStore;
pub use pool::{connect, init_schema};
pub use store::{ComparisonStore, ForecastStore, ObservationStore};
