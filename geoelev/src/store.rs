//! Directory-backed tile source with eager or lazy loading.
//!
//! [`DirectoryTileStore`] serves `.hgt` files from a data directory. With
//! [`LoadPolicy::Eager`] every tile is memory-mapped up front and kept for the
//! life of the store; with [`LoadPolicy::Lazy`] tiles are mapped on first use
//! and held in a bounded LRU cache. A `.hgt.zip` archive next to a missing
//! `.hgt` file is extracted on first use.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use moka::sync::Cache;

use tempfile::NamedTempFile;

use crate::error::{ElevationError, Result};
use crate::filename::TileKey;
use crate::registry::TileSource;
use crate::tile::{grid_side, TileBytes};

/// When tile files are mapped into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Map tiles on first lookup and keep them in a bounded cache.
    #[default]
    Lazy,
    /// Map every tile in the directory when the store is built.
    Eager,
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of tiles currently held in memory.
    pub entry_count: u64,
    /// Number of lookups served from memory.
    pub hit_count: u64,
    /// Number of lookups that had to go to disk (or found nothing).
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// A geographic bounding box for filtering tiles during preload.
///
/// Coordinates are in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Check if this bounding box overlaps the 1°×1° tile identified by `key`.
    ///
    /// The tile covers `[lat, lat+1) × [lon, lon+1)`, so touching its northern
    /// or eastern edge is not an overlap.
    pub fn overlaps_tile(&self, key: &TileKey) -> bool {
        let (tile_lat, tile_lon) = key.anchor();

        self.min_lat < tile_lat + 1.0
            && self.max_lat > tile_lat
            && self.min_lon < tile_lon + 1.0
            && self.max_lon > tile_lon
    }
}

/// Statistics from a preload operation.
#[derive(Debug, Clone, Default)]
pub struct PreloadStats {
    /// Number of tiles successfully loaded.
    pub tiles_loaded: u64,
    /// Number of tiles that were already in memory.
    pub tiles_already_cached: u64,
    /// Number of tiles that failed to load.
    pub tiles_failed: u64,
    /// Number of tiles that matched the bounding box filter.
    pub tiles_matched: u64,
    /// Total elapsed time in milliseconds.
    pub elapsed_ms: u64,
}

/// Tile source reading `.hgt` files from a directory.
///
/// Lookups never fail: a missing file is `None`, and an unreadable one is
/// logged and treated as missing. Size validation is left to the registry,
/// so a truncated file surfaces as a corrupt tile at query time.
pub struct DirectoryTileStore {
    /// Directory containing .hgt files.
    data_dir: PathBuf,
    policy: LoadPolicy,
    /// Tiles loaded by preload in eager mode; never evicted.
    pinned: RwLock<HashMap<TileKey, TileBytes>>,
    /// LRU cache of lazily loaded tiles.
    tile_cache: Cache<TileKey, TileBytes>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl DirectoryTileStore {
    /// Create a store over `data_dir`.
    ///
    /// `cache_size` bounds the number of lazily loaded tiles kept in memory.
    /// In eager mode the whole directory is preloaded immediately.
    pub fn new<P: AsRef<Path>>(data_dir: P, cache_size: u64, policy: LoadPolicy) -> Self {
        let store = Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            policy,
            pinned: RwLock::new(HashMap::new()),
            tile_cache: Cache::builder().max_capacity(cache_size).build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        };

        if policy == LoadPolicy::Eager {
            let stats = store.preload(None);
            tracing::debug!(
                data_dir = %store.data_dir.display(),
                tiles_loaded = stats.tiles_loaded,
                tiles_failed = stats.tiles_failed,
                "Eagerly loaded tiles"
            );
        }

        store
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The store's load policy.
    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Get the maximum number of lazily cached tiles.
    pub fn cache_capacity(&self) -> u64 {
        self.tile_cache.policy().max_capacity().unwrap_or(0)
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.tile_cache.run_pending_tasks();
        CacheStats {
            entry_count: self.read_pinned().len() as u64 + self.tile_cache.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// Drop all lazily cached tiles. Eagerly loaded tiles stay resident.
    pub fn clear_cache(&self) {
        self.tile_cache.invalidate_all();
    }

    /// Scan the data directory for `.hgt` and `.hgt.zip` files.
    ///
    /// Returns a sorted, deduplicated list of tile filenames (e.g., `["N47E013.hgt"]`).
    /// If both `N47E013.hgt` and `N47E013.hgt.zip` exist, the tile is listed once.
    pub fn scan_tile_files(&self) -> Vec<String> {
        let mut filenames = HashSet::new();

        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    data_dir = %self.data_dir.display(),
                    error = %e,
                    "Cannot read data directory"
                );
                return Vec::new();
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if let Some(hgt_name) = name.strip_suffix(".zip") {
                if hgt_name.ends_with(".hgt") {
                    filenames.insert(hgt_name.to_string());
                }
            } else if name.ends_with(".hgt") {
                filenames.insert(name.to_string());
            }
        }

        let mut result: Vec<String> = filenames.into_iter().collect();
        result.sort();
        result
    }

    /// Load tiles from the data directory into memory.
    ///
    /// In eager mode loaded tiles are pinned; in lazy mode they warm the LRU
    /// cache. Optionally filters tiles by one or more bounding boxes: with
    /// `Some`, only tiles overlapping at least one box are loaded. Files whose
    /// names are not tile keys are skipped.
    pub fn preload(&self, bounds: Option<&[BoundingBox]>) -> PreloadStats {
        let start = Instant::now();
        let mut stats = PreloadStats::default();

        for filename in self.scan_tile_files() {
            let key = match TileKey::parse(&filename) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping file");
                    continue;
                }
            };

            if let Some(boxes) = bounds {
                if !boxes.iter().any(|b| b.overlaps_tile(&key)) {
                    continue;
                }
            }

            stats.tiles_matched += 1;

            if self.resident(&key).is_some() {
                stats.tiles_already_cached += 1;
                continue;
            }

            match self.load_tile(&key) {
                Ok(Some(bytes)) if grid_side(bytes.len()).is_some() => {
                    self.keep(key, bytes);
                    stats.tiles_loaded += 1;
                }
                Ok(Some(bytes)) => {
                    tracing::warn!(tile = %key, len = bytes.len(), "Not a square grid, skipping");
                    stats.tiles_failed += 1;
                }
                Ok(None) => stats.tiles_failed += 1,
                Err(e) => {
                    tracing::warn!(tile = %key, error = %e, "Failed to preload tile");
                    stats.tiles_failed += 1;
                }
            }
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        stats
    }

    fn read_pinned(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TileKey, TileBytes>> {
        self.pinned
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Tile bytes already held in memory, without touching disk or counters.
    fn resident(&self, key: &TileKey) -> Option<TileBytes> {
        self.read_pinned()
            .get(key)
            .cloned()
            .or_else(|| self.tile_cache.get(key))
    }

    fn keep(&self, key: TileKey, bytes: TileBytes) {
        match self.policy {
            LoadPolicy::Eager => {
                self.pinned
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .insert(key, bytes);
            }
            LoadPolicy::Lazy => self.tile_cache.insert(key, bytes),
        }
    }

    /// Map a tile from disk, extracting it from a `.hgt.zip` first if needed.
    ///
    /// `Ok(None)` if neither file exists.
    fn load_tile(&self, key: &TileKey) -> Result<Option<TileBytes>> {
        let filename = key.file_name();
        let path = self.data_dir.join(&filename);

        if !path.exists() {
            let zip_path = self.data_dir.join(format!("{}.zip", filename));
            if !zip_path.exists() {
                return Ok(None);
            }
            self.extract_hgt_from_zip(&zip_path, &filename)?;
        }

        tracing::debug!(tile = %key, path = %path.display(), "Mapping tile");
        TileBytes::map_file(&path).map(Some)
    }

    /// Extract an .hgt file from a local .hgt.zip archive.
    ///
    /// The entry is written to a temporary file in the data directory and
    /// renamed into place once complete, so `{filename}` either does not
    /// exist or holds the whole tile. A failed extraction leaves nothing
    /// behind.
    fn extract_hgt_from_zip(&self, zip_path: &Path, filename: &str) -> Result<()> {
        let file = std::fs::File::open(zip_path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;

            let entry_name = entry.name().to_string();
            if entry_name.ends_with(".hgt") || entry_name == filename {
                let mut staging = NamedTempFile::new_in(&self.data_dir)?;
                std::io::copy(&mut entry, staging.as_file_mut())?;
                staging
                    .persist(self.data_dir.join(filename))
                    .map_err(|e| e.error)?;
                tracing::debug!(archive = %zip_path.display(), "Extracted tile");
                return Ok(());
            }
        }

        Err(ElevationError::Zip(format!(
            "No .hgt file found in {}",
            zip_path.display()
        )))
    }
}

impl TileSource for DirectoryTileStore {
    fn lookup(&self, key: &TileKey) -> Option<TileBytes> {
        if let Some(bytes) = self.resident(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Some(bytes);
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);

        // Eager stores only serve what was preloaded.
        if self.policy == LoadPolicy::Eager {
            return None;
        }

        // Concurrent misses on one key share a single load.
        let loaded = self.tile_cache.try_get_with(*key, || match self.load_tile(key) {
            Ok(Some(bytes)) if grid_side(bytes.len()).is_some() => Ok(bytes),
            Ok(Some(bytes)) => Err(LoadFailure::NotAGrid(bytes)),
            Ok(None) => Err(LoadFailure::Missing),
            Err(e) => Err(LoadFailure::Failed(e)),
        });

        match loaded {
            Ok(bytes) => Some(bytes),
            Err(failure) => match failure.as_ref() {
                LoadFailure::Missing => None,
                // Handed out uncached so the registry reports the corrupt tile.
                LoadFailure::NotAGrid(bytes) => Some(bytes.clone()),
                LoadFailure::Failed(e) => {
                    tracing::warn!(tile = %key, error = %e, "Failed to load tile");
                    None
                }
            },
        }
    }
}

/// Why a lazy load produced nothing worth caching.
enum LoadFailure {
    Missing,
    NotAGrid(TileBytes),
    Failed(ElevationError),
}

impl std::fmt::Debug for DirectoryTileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryTileStore")
            .field("data_dir", &self.data_dir)
            .field("policy", &self.policy)
            .field("cache_capacity", &self.cache_capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    const SIDE: usize = 11;

    /// Write a small test tile with every sample set to `elevation`.
    fn create_test_tile(dir: &Path, filename: &str, elevation: i16) {
        let data: Vec<u8> = elevation
            .to_be_bytes()
            .iter()
            .copied()
            .cycle()
            .take(SIDE * SIDE * 2)
            .collect();
        fs::write(dir.join(filename), data).unwrap();
    }

    fn create_test_zip(dir: &Path, filename: &str) {
        let zip_path = dir.join(format!("{}.zip", filename));
        let file = fs::File::create(&zip_path).unwrap();
        let mut zip_writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip_writer.start_file(filename, options).unwrap();
        zip_writer.write_all(&vec![0u8; SIDE * SIDE * 2]).unwrap();
        zip_writer.finish().unwrap();
    }

    #[test]
    fn test_lazy_lookup_loads_on_demand() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N47E013.hgt", 500);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        assert_eq!(store.cache_stats().miss_count, 0);

        let bytes = store.lookup(&TileKey::new(47, 13)).unwrap();
        assert_eq!(bytes.len(), SIDE * SIDE * 2);
        assert_eq!(store.cache_stats().miss_count, 1);

        store.lookup(&TileKey::new(47, 13)).unwrap();
        let stats = store.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        assert!(store.lookup(&TileKey::new(50, 50)).is_none());
    }

    #[test]
    fn test_eager_loads_everything_up_front() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N47E013.hgt", 500);
        create_test_tile(temp_dir.path(), "N44W072.hgt", 759);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Eager);
        assert_eq!(store.cache_stats().entry_count, 2);

        assert!(store.lookup(&TileKey::new(44, -72)).is_some());
        assert_eq!(store.cache_stats().hit_count, 1);

        // files added after startup are not picked up in eager mode
        create_test_tile(temp_dir.path(), "N48E013.hgt", 600);
        assert!(store.lookup(&TileKey::new(48, 13)).is_none());
    }

    #[test]
    fn test_hgt_zip_extraction() {
        let temp_dir = TempDir::new().unwrap();
        create_test_zip(temp_dir.path(), "N40E010.hgt");

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        let bytes = store.lookup(&TileKey::new(40, 10)).unwrap();
        assert_eq!(bytes.len(), SIDE * SIDE * 2);

        assert!(temp_dir.path().join("N40E010.hgt").exists());
    }

    /// Write `{filename}.zip` holding a deflated SRTM3 grid.
    fn create_srtm3_zip(dir: &Path, filename: &str) {
        let side = 1201;
        let mut data = vec![0u8; side * side * 2];
        for (i, sample) in data.chunks_exact_mut(2).enumerate() {
            sample.copy_from_slice(&((i % 3000) as i16).to_be_bytes());
        }

        let file = fs::File::create(dir.join(format!("{}.zip", filename))).unwrap();
        let mut zip_writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip_writer.start_file(filename, options).unwrap();
        zip_writer.write_all(&data).unwrap();
        zip_writer.finish().unwrap();
    }

    #[test]
    fn test_concurrent_zip_loads_see_whole_tile() {
        use crate::tile::Tile;
        use std::sync::{Arc, Barrier};

        const THREADS: usize = 8;

        for _ in 0..5 {
            let temp_dir = TempDir::new().unwrap();
            create_srtm3_zip(temp_dir.path(), "N40E010.hgt");

            let store = Arc::new(DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy));
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        let key = TileKey::new(40, 10);
                        let bytes = store.lookup(&key).expect("tile should be available");
                        let tile = Tile::new(key, bytes).expect("tile should be a full grid");
                        assert_eq!(tile.side(), 1201);
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(
                fs::metadata(temp_dir.path().join("N40E010.hgt")).unwrap().len(),
                1201 * 1201 * 2
            );
        }
    }

    #[test]
    fn test_failed_zip_extraction_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();

        // A stored entry whose payload no longer matches its checksum: the
        // archive opens fine but reading the entry fails at the end.
        let payload = vec![0x11u8; SIDE * SIDE * 2];
        let zip_path = temp_dir.path().join("N40E010.hgt.zip");
        {
            let file = fs::File::create(&zip_path).unwrap();
            let mut zip_writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip_writer.start_file("N40E010.hgt", options).unwrap();
            zip_writer.write_all(&payload).unwrap();
            zip_writer.finish().unwrap();
        }
        let mut archive = fs::read(&zip_path).unwrap();
        let start = archive
            .windows(64)
            .position(|w| w.iter().all(|b| *b == 0x11))
            .unwrap();
        archive[start + 100] = 0x22;
        fs::write(&zip_path, archive).unwrap();

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        assert!(store.lookup(&TileKey::new(40, 10)).is_none());
        assert!(store.lookup(&TileKey::new(40, 10)).is_none());

        let mut leftovers: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, vec!["N40E010.hgt.zip"]);
    }

    #[test]
    fn test_non_grid_file_is_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("N40E010.hgt"), vec![0u8; 1001]).unwrap();

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        {
            let bytes = store.lookup(&TileKey::new(40, 10)).unwrap();
            assert_eq!(bytes.len(), 1001);
        }
        assert_eq!(store.cache_stats().entry_count, 0);

        // replaced with a proper grid, the tile is picked up on the next lookup
        create_test_tile(temp_dir.path(), "N40E010.hgt", 500);
        let bytes = store.lookup(&TileKey::new(40, 10)).unwrap();
        assert_eq!(bytes.len(), SIDE * SIDE * 2);
        assert_eq!(store.cache_stats().entry_count, 1);

        let stats = store.preload(None);
        assert_eq!(stats.tiles_already_cached, 1);
    }

    #[test]
    fn test_broken_zip_is_logged_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("N40E010.hgt.zip"), b"not a zip").unwrap();

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        assert!(store.lookup(&TileKey::new(40, 10)).is_none());
    }

    #[test]
    fn test_clear_cache() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N47E013.hgt", 500);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        store.lookup(&TileKey::new(47, 13));
        assert_eq!(store.cache_stats().miss_count, 1);

        store.clear_cache();

        store.lookup(&TileKey::new(47, 13));
        assert_eq!(store.cache_stats().miss_count, 2);
    }

    #[test]
    fn test_cache_stats() {
        let stats = CacheStats {
            entry_count: 5,
            hit_count: 80,
            miss_count: 20,
        };
        assert_eq!(stats.hit_rate(), 0.8);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_cache_capacity() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryTileStore::new(temp_dir.path(), 100, LoadPolicy::Lazy);
        assert_eq!(store.cache_capacity(), 100);
    }

    #[test]
    fn test_preload_with_bounding_box() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);
        create_test_tile(temp_dir.path(), "N50E010.hgt", 1000);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);

        let bbox = BoundingBox::new(34.0, 137.0, 37.0, 140.0);
        let stats = store.preload(Some(&[bbox]));
        assert_eq!(stats.tiles_matched, 1);
        assert_eq!(stats.tiles_loaded, 1);

        // second run finds it resident
        let stats = store.preload(Some(&[bbox]));
        assert_eq!(stats.tiles_loaded, 0);
        assert_eq!(stats.tiles_already_cached, 1);
    }

    #[test]
    fn test_preload_skips_malformed_names() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);
        create_test_tile(temp_dir.path(), "backup.hgt", 500);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        let stats = store.preload(None);
        assert_eq!(stats.tiles_matched, 1);
        assert_eq!(stats.tiles_loaded, 1);
        assert_eq!(stats.tiles_failed, 0);
    }

    #[test]
    fn test_preload_with_zip_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_zip(temp_dir.path(), "N40E010.hgt");
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        let stats = store.preload(None);

        assert_eq!(stats.tiles_matched, 2);
        assert_eq!(stats.tiles_loaded, 2);
        assert_eq!(stats.tiles_failed, 0);
    }

    #[test]
    fn test_bounding_box_overlaps_tile() {
        let tile = TileKey::new(35, 138);

        assert!(BoundingBox::new(35.5, 138.5, 36.5, 139.5).overlaps_tile(&tile));
        assert!(!BoundingBox::new(40.0, 140.0, 41.0, 141.0).overlaps_tile(&tile));
        // touching the north-east corner is not an overlap
        assert!(!BoundingBox::new(36.0, 139.0, 37.0, 140.0).overlaps_tile(&tile));
        assert!(BoundingBox::new(35.2, 138.2, 35.8, 138.8).overlaps_tile(&tile));

        let bbox = BoundingBox::new(-13.5, -78.5, -11.5, -76.5);
        assert!(bbox.overlaps_tile(&TileKey::new(-13, -78)));
        assert!(bbox.overlaps_tile(&TileKey::new(-12, -77)));
    }

    #[test]
    fn test_scan_tile_files_deduplicates_zip() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);
        create_test_tile(temp_dir.path(), "N36E139.hgt", 500);
        create_test_zip(temp_dir.path(), "N35E138.hgt");
        fs::write(temp_dir.path().join("readme.txt"), "not a tile").unwrap();
        fs::write(temp_dir.path().join("notes.zip"), "not a tile").unwrap();

        let store = DirectoryTileStore::new(temp_dir.path(), 10, LoadPolicy::Lazy);
        assert_eq!(store.scan_tile_files(), vec!["N35E138.hgt", "N36E139.hgt"]);
    }
}
