//! On-disk store of decoded tile rasters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashSet;
use tracing::{debug, info};

use super::CacheError;
use crate::coord::TileId;
use crate::raster::PixelGrid;

/// Extension of persisted pixel grids.
pub const CACHE_EXTENSION: &str = "grid";

/// Persistent tile cache for one provider namespace.
///
/// Each tile is a bincode-encoded [`PixelGrid`] at
/// `{root}/{namespace}/{cache_stem}.grid`. The set of present keys is loaded
/// once when the cache is opened and grows as tiles are written; clones share
/// the same index.
#[derive(Debug, Clone)]
pub struct TileCache {
    directory: PathBuf,
    index: Arc<DashSet<String>>,
    tmp_counter: Arc<AtomicU64>,
}

impl TileCache {
    /// Opens (creating if needed) the cache directory for a namespace and
    /// loads its index.
    ///
    /// # Errors
    ///
    /// [`CacheError::CreateDir`] if the directory cannot be created, which
    /// callers treat as fatal rather than running uncached.
    pub fn open(root: &Path, namespace: &str) -> Result<Self, CacheError> {
        let directory = root.join(namespace);
        std::fs::create_dir_all(&directory).map_err(|source| CacheError::CreateDir {
            path: directory.clone(),
            source,
        })?;

        let index = DashSet::new();
        for entry in std::fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                index.insert(stem.to_string());
            }
        }

        info!(
            directory = %directory.display(),
            entries = index.len(),
            "Tile cache opened"
        );

        Ok(Self {
            directory,
            index: Arc::new(index),
            tmp_counter: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Directory holding this namespace's entries.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether the index knows the tile.
    pub fn contains(&self, tile: &TileId) -> bool {
        self.index.contains(&tile.cache_stem())
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path an entry is stored at.
    pub fn path_for(&self, tile: &TileId) -> PathBuf {
        self.directory
            .join(format!("{}.{}", tile.cache_stem(), CACHE_EXTENSION))
    }

    /// Reads a persisted grid.
    ///
    /// Returns `Ok(None)` on a miss. An entry whose file has disappeared is
    /// dropped from the index and reported as a miss so the tile is fetched
    /// again; an unreadable or corrupt entry is an error.
    pub async fn get(&self, tile: &TileId) -> Result<Option<PixelGrid>, CacheError> {
        let key = tile.cache_stem();
        if !self.index.contains(&key) {
            return Ok(None);
        }

        let path = self.path_for(tile);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(tile = %tile, "Cache entry vanished from disk");
                self.index.remove(&key);
                return Ok(None);
            }
            Err(e) => return Err(CacheError::Io(e)),
        };

        let grid: PixelGrid =
            bincode::deserialize(&bytes).map_err(|e| CacheError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        grid.validate().map_err(|e| CacheError::Corrupt {
            path,
            reason: e.to_string(),
        })?;

        Ok(Some(grid))
    }

    /// Persists a grid and adds it to the index.
    ///
    /// Writes to a temporary file and renames it into place, so concurrent
    /// readers never observe a partial entry.
    pub async fn put(&self, tile: &TileId, grid: &PixelGrid) -> Result<(), CacheError> {
        let bytes = bincode::serialize(grid).map_err(|e| CacheError::Encode(e.to_string()))?;

        let path = self.path_for(tile);
        let tmp = self.directory.join(format!(
            ".{}.{}.tmp",
            tile.cache_stem(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::Io(e));
        }

        self.index.insert(tile.cache_stem());
        debug!(tile = %tile, bytes = bytes.len(), "Tile cached");
        Ok(())
    }

    /// Removes every persisted entry of this namespace.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION) {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        self.index.clear();
        info!(directory = %self.directory.display(), removed, "Tile cache cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Quadkey, TileCoord};
    use crate::raster::ColorMode;
    use tempfile::TempDir;

    fn tile(x: u32, y: u32, zoom: u8) -> TileId {
        TileId::Cartesian(TileCoord::new(x, y, zoom).unwrap())
    }

    fn grid() -> PixelGrid {
        PixelGrid::filled(4, 4, ColorMode::Rgb, [1, 2, 3, 255])
    }

    #[test]
    fn test_open_creates_namespace_directory() {
        let temp = TempDir::new().unwrap();
        let cache = TileCache::open(temp.path(), "osm-12345678").unwrap();
        assert!(cache.directory().is_dir());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_open_fails_when_root_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let result = TileCache::open(&file, "osm");
        assert!(matches!(result, Err(CacheError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let temp = TempDir::new().unwrap();
        let cache = TileCache::open(temp.path(), "ns").unwrap();
        let id = tile(3, 5, 4);

        assert_eq!(cache.get(&id).await.unwrap(), None);
        cache.put(&id, &grid()).await.unwrap();

        assert!(cache.contains(&id));
        assert!(cache.path_for(&id).ends_with("3_5_4.grid"));
        assert_eq!(cache.get(&id).await.unwrap(), Some(grid()));
    }

    #[tokio::test]
    async fn test_index_loaded_on_reopen() {
        let temp = TempDir::new().unwrap();
        let quadkey = TileId::Quadkey(Quadkey::new("0213").unwrap());
        {
            let cache = TileCache::open(temp.path(), "ns").unwrap();
            cache.put(&tile(0, 0, 1), &grid()).await.unwrap();
            cache.put(&quadkey, &grid()).await.unwrap();
        }

        let reopened = TileCache::open(temp.path(), "ns").unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains(&quadkey));
        assert_eq!(reopened.get(&tile(0, 0, 1)).await.unwrap(), Some(grid()));
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let temp = TempDir::new().unwrap();
        let a = TileCache::open(temp.path(), "a").unwrap();
        let b = TileCache::open(temp.path(), "b").unwrap();
        a.put(&tile(1, 1, 1), &grid()).await.unwrap();

        assert!(!b.contains(&tile(1, 1, 1)));
        assert_eq!(b.get(&tile(1, 1, 1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_error() {
        let temp = TempDir::new().unwrap();
        let cache = TileCache::open(temp.path(), "ns").unwrap();
        let id = tile(2, 2, 2);
        cache.put(&id, &grid()).await.unwrap();
        std::fs::write(cache.path_for(&id), b"garbage").unwrap();

        assert!(matches!(
            cache.get(&id).await,
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_vanished_entry_is_miss() {
        let temp = TempDir::new().unwrap();
        let cache = TileCache::open(temp.path(), "ns").unwrap();
        let id = tile(1, 0, 1);
        cache.put(&id, &grid()).await.unwrap();
        std::fs::remove_file(cache.path_for(&id)).unwrap();

        assert_eq!(cache.get(&id).await.unwrap(), None);
        assert!(!cache.contains(&id));
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let temp = TempDir::new().unwrap();
        let cache = TileCache::open(temp.path(), "ns").unwrap();
        cache.put(&tile(0, 0, 1), &grid()).await.unwrap();
        cache.put(&tile(1, 0, 1), &grid()).await.unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.is_empty());
        assert_eq!(TileCache::open(temp.path(), "ns").unwrap().len(), 0);
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ns");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("README"), b"hi").unwrap();
        std::fs::write(dir.join(".1_1_1.0.tmp"), b"partial").unwrap();

        assert_eq!(TileCache::open(temp.path(), "ns").unwrap().len(), 0);
    }
}
