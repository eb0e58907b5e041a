//! Domain tile discovery
//!
//! Given a region of interest in projected units and a target zoom, walks the
//! quadtree from the root and yields every tile at the target zoom whose
//! bounding box intersects the region. Subtrees whose bounding box misses the
//! region are pruned, so the walk visits only the tiles that actually cover
//! the region rather than all `4^z` cells.
//!
//! # Example
//!
//! ```
//! use tilestitch::coord::{Addressing, TileGrid};
//! use tilestitch::domain::{Domain, DomainTileFinder};
//!
//! let grid = TileGrid::web_mercator();
//! let finder = DomainTileFinder::new(grid, Addressing::Xyz);
//! let domain = Domain::from_extent(&grid.root_extent());
//!
//! let tiles: Vec<_> = finder.find(&domain, 2).unwrap().collect();
//! assert_eq!(tiles.len(), 16);
//! ```

mod finder;
mod region;

pub use finder::{DomainError, DomainTileFinder, FindTiles};
pub use region::Domain;
