//! Service error types.

use thiserror::Error;

use crate::cache::CacheError;
use crate::domain::DomainError;
use crate::mosaic::MergeError;
use crate::provider::ProviderError;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Provider or HTTP client could not be created
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Cache directory unusable; the service does not fall back to running
    /// uncached
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Invalid discovery request
    #[error("Invalid request: {0}")]
    Domain(#[from] DomainError),

    /// Tiles could not be merged
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// No tile at the requested zoom intersects the domain
    #[error("No tiles at zoom {zoom} intersect the domain")]
    EmptyDomain { zoom: u8 },

    /// Every tile of the domain was dropped
    #[error("None of the {requested} tiles could be resolved")]
    NothingResolved { requested: usize },

    /// The query was cancelled before any tile completed
    #[error("Domain query cancelled")]
    Cancelled,

    /// Failed to create the Tokio runtime for blocking calls
    #[error("Runtime error: {0}")]
    Runtime(#[source] std::io::Error),
}
