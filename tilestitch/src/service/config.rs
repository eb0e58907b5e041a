//! Service configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::default_cache_root;
use crate::coord::{Addressing, YAxis};
use crate::orchestrator::MAX_CONCURRENT_FETCHES;
use crate::provider::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::raster::ColorMode;

/// Hard upper bound for the concurrency limit.
pub const MAX_CONCURRENT_LIMIT: usize = 256;

/// Configuration for a [`TileService`](super::TileService).
///
/// Unset options fall back to the provider's own metadata (color mode,
/// addressing) or to crate defaults.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tilestitch::raster::ColorMode;
/// use tilestitch::service::ServiceConfig;
///
/// let config = ServiceConfig::default()
///     .with_max_concurrent(8)
///     .with_timeout(Duration::from_secs(10))
///     .with_color_mode(ColorMode::Rgba)
///     .without_cache();
///
/// assert_eq!(config.max_concurrent(), 8);
/// assert!(!config.cache_enabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    cache_enabled: bool,
    cache_directory: Option<PathBuf>,
    user_agent: String,
    timeout: Duration,
    max_concurrent: usize,
    color_mode: Option<ColorMode>,
    addressing: Option<Addressing>,
    y_axis: YAxis,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_directory: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrent: MAX_CONCURRENT_FETCHES,
            color_mode: None,
            addressing: None,
            y_axis: YAxis::NorthOrigin,
        }
    }
}

impl ServiceConfig {
    /// Sets the cache root; each provider gets its own subdirectory.
    pub fn with_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory = Some(path.into());
        self.cache_enabled = true;
        self
    }

    /// Disables the persistent cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Sets the identifying `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of concurrent fetches, clamped to `1..=256`.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.clamp(1, MAX_CONCURRENT_LIMIT);
        self
    }

    /// Overrides the provider's color mode.
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = Some(color_mode);
        self
    }

    /// Overrides the provider's addressing for tile discovery.
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = Some(addressing);
        self
    }

    /// Sets the row-numbering convention of Cartesian tiles.
    pub fn with_y_axis(mut self, y_axis: YAxis) -> Self {
        self.y_axis = y_axis;
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// The configured cache root, if any.
    pub fn cache_directory(&self) -> Option<&Path> {
        self.cache_directory.as_deref()
    }

    /// The cache root that will be used: the configured one or
    /// [`default_cache_root`].
    pub fn resolved_cache_directory(&self) -> PathBuf {
        self.cache_directory
            .clone()
            .unwrap_or_else(default_cache_root)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn color_mode(&self) -> Option<ColorMode> {
        self.color_mode
    }

    pub fn addressing(&self) -> Option<Addressing> {
        self.addressing
    }

    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }
}
