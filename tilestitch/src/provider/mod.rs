//! Web map tile provider abstraction
//!
//! A provider maps a tile identifier to a URL and declares static metadata
//! (tile size, color mode, addressing). Downloading goes through the
//! [`AsyncHttpClient`] trait so tests can inject a mock client.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use the [`ProviderFactory`]:
//!
//! ```
//! use tilestitch::provider::{ProviderConfig, ProviderFactory};
//!
//! let config = ProviderConfig::Google {
//!     style: "terrain".to_string(),
//!     url: None,
//! };
//! let provider = ProviderFactory::create(&config).unwrap();
//! assert_eq!(provider.tile_size(), 256);
//! ```

mod azure;
mod factory;
mod google;
mod http;
mod mapbox;
mod ordnance;
mod osm;
mod quadtree;
mod template;
mod types;

pub use azure::{AzureMapsProvider, DEFAULT_AZURE_API_VERSION, DEFAULT_AZURE_TILESET};
pub use factory::{ProviderConfig, ProviderFactory};
pub use google::{GoogleStyle, GoogleTilesProvider, GOOGLE_URL};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use mapbox::{MapboxProvider, MapboxStyleProvider};
pub use ordnance::{OrdnanceSurveyProvider, OsLayer};
pub use osm::OsmProvider;
pub use quadtree::QuadtreeProvider;
pub use template::TemplateProvider;
pub use types::{quadkey_of, xyz_of, Provider, ProviderError, DEFAULT_TILE_SIZE};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
