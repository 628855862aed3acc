pub mod collectors;
pub mod comparison;
pub mod config;
pub mod db;
pub mod dedup;
pub mod extract;
pub mod fetch_error;
pub mod layouts;
pub mod models;
pub mod page_source;
pub mod parse_error;
pub mod pipeline;
pub mod time_normalizer;
