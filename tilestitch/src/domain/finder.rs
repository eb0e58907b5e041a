//! Pruned quadtree descent over a tile grid.

use thiserror::Error;

use super::region::Domain;
use crate::coord::{children_of, Addressing, Quadkey, TileCoord, TileGrid, TileId, MAX_ZOOM};

/// Errors rejected before any traversal starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Target zoom not representable in the addressing scheme.
    #[error("Invalid target zoom {zoom} for {addressing} addressing: {reason}")]
    InvalidZoom {
        zoom: u8,
        addressing: Addressing,
        reason: &'static str,
    },

    /// Start tile is deeper than the target zoom.
    #[error("Start tile {start} is below target zoom {target}")]
    StartBelowTarget { start: TileId, target: u8 },

    /// Start tile uses the other addressing scheme.
    #[error("Start tile {start} does not use {expected} addressing")]
    AddressingMismatch { start: TileId, expected: Addressing },
}

/// Discovers the tiles at one zoom level that intersect a [`Domain`].
///
/// Each call to [`find`](Self::find) returns a fresh iterator that walks the
/// tree from scratch; the finder holds no traversal state of its own.
#[derive(Debug, Clone, Copy)]
pub struct DomainTileFinder {
    grid: TileGrid,
    addressing: Addressing,
}

impl DomainTileFinder {
    pub fn new(grid: TileGrid, addressing: Addressing) -> Self {
        Self { grid, addressing }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Walks from the root (or the four depth-1 quadkeys) down to `target_zoom`.
    ///
    /// Tiles are yielded depth-first, visiting children in
    /// [`TileGrid::children`] order, so repeated calls with the same inputs
    /// produce the same sequence.
    pub fn find<'a>(
        &self,
        domain: &'a Domain,
        target_zoom: u8,
    ) -> Result<FindTiles<'a>, DomainError> {
        self.check_target(target_zoom)?;
        let seeds = match self.addressing {
            Addressing::Xyz => vec![TileId::Cartesian(TileCoord::root())],
            // No quadkey addresses the root, so the four quadrants each
            // start their own walk.
            Addressing::Quadkey => ["3", "2", "1", "0"]
                .into_iter()
                .filter_map(|digits| Quadkey::new(digits).ok())
                .map(TileId::Quadkey)
                .collect(),
        };
        Ok(FindTiles::new(self.grid, domain, target_zoom, seeds))
    }

    /// Walks the subtree below `start` down to `target_zoom`.
    pub fn find_from<'a>(
        &self,
        domain: &'a Domain,
        target_zoom: u8,
        start: TileId,
    ) -> Result<FindTiles<'a>, DomainError> {
        self.check_target(target_zoom)?;
        if start.addressing() != self.addressing {
            return Err(DomainError::AddressingMismatch {
                start,
                expected: self.addressing,
            });
        }
        if start.zoom() > target_zoom {
            return Err(DomainError::StartBelowTarget {
                start,
                target: target_zoom,
            });
        }
        Ok(FindTiles::new(self.grid, domain, target_zoom, vec![start]))
    }

    fn check_target(&self, target_zoom: u8) -> Result<(), DomainError> {
        if target_zoom > MAX_ZOOM {
            return Err(DomainError::InvalidZoom {
                zoom: target_zoom,
                addressing: self.addressing,
                reason: "exceeds maximum zoom",
            });
        }
        if self.addressing == Addressing::Quadkey && target_zoom == 0 {
            return Err(DomainError::InvalidZoom {
                zoom: 0,
                addressing: Addressing::Quadkey,
                reason: "quadkeys start at zoom 1",
            });
        }
        Ok(())
    }
}

/// Lazy, finite sequence of tiles produced by [`DomainTileFinder`].
///
/// Uses an explicit stack; children are pushed in reverse so the NW child is
/// visited first.
#[derive(Debug)]
pub struct FindTiles<'a> {
    grid: TileGrid,
    domain: &'a Domain,
    target_zoom: u8,
    stack: Vec<TileId>,
}

impl<'a> FindTiles<'a> {
    fn new(grid: TileGrid, domain: &'a Domain, target_zoom: u8, stack: Vec<TileId>) -> Self {
        Self {
            grid,
            domain,
            target_zoom,
            stack,
        }
    }
}

impl Iterator for FindTiles<'_> {
    type Item = TileId;

    fn next(&mut self) -> Option<TileId> {
        while let Some(tile) = self.stack.pop() {
            if !self.domain.intersects(&self.grid.bounding_box(&tile)) {
                continue;
            }
            if tile.zoom() >= self.target_zoom {
                return Some(tile);
            }
            // target_zoom <= MAX_ZOOM, so the child depth is valid
            let children = children_of(&tile);
            self.stack.extend(children.into_iter().rev());
        }
        None
    }
}
