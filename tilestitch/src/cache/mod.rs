//! Persistent tile cache
//!
//! Decoded rasters are persisted per provider namespace so repeated queries
//! over the same region skip both the network and the image decoder.

mod disk;

pub use disk::{TileCache, CACHE_EXTENSION};

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory could not be created.
    #[error("Failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading or writing an entry.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted entry could not be decoded.
    #[error("Corrupt cache entry {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A grid could not be serialized.
    #[error("Failed to encode cache entry: {0}")]
    Encode(String),
}

/// Default cache root, `~/.cache/tilestitch` on Linux.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilestitch")
}
