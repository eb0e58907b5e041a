//! High-level service API
//!
//! [`TileService`] ties discovery, fetching, caching and merging together for
//! one provider.

mod config;
mod error;
mod facade;

pub use config::{ServiceConfig, MAX_CONCURRENT_LIMIT};
pub use error::ServiceError;
pub use facade::TileService;
