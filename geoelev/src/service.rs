//! High-level elevation service over a directory of tiles.
//!
//! [`ElevationService`] ties a [`DirectoryTileStore`] to a [`TileRegistry`]
//! and adds batch queries and configuration from the environment.
//!
//! ```ignore
//! use geoelev::{ElevationServiceBuilder, LoadPolicy};
//!
//! let service = ElevationServiceBuilder::new("/data/srtm")
//!     .cache_size(100)
//!     .load_policy(LoadPolicy::Lazy)
//!     .build()?;
//!
//! let exact = service.get_elevation(44.1, -71.1, false)?;
//! let smooth = service.get_elevation(44.1, -71.1, true)?;
//! ```

use std::path::{Path, PathBuf};

use crate::error::{ElevationError, Result};
use crate::registry::TileRegistry;
use crate::store::{BoundingBox, CacheStats, DirectoryTileStore, LoadPolicy, PreloadStats};

/// Default number of lazily cached tiles.
pub const DEFAULT_CACHE_SIZE: u64 = 100;

/// Elevation queries against a directory of `.hgt` files.
#[derive(Debug)]
pub struct ElevationService {
    registry: TileRegistry<DirectoryTileStore>,
}

impl ElevationService {
    /// Create a lazily loading service with the given cache size.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::DataDirNotFound`] if `data_dir` does not exist.
    pub fn new<P: AsRef<Path>>(data_dir: P, cache_size: u64) -> Result<Self> {
        ElevationServiceBuilder::new(data_dir)
            .cache_size(cache_size)
            .build()
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> ElevationServiceBuilder {
        ElevationServiceBuilder::new(data_dir)
    }

    /// Get elevation for the given coordinates.
    ///
    /// With `approximate` the value is blended from the four neighbouring
    /// samples; otherwise it is the exact grid sample.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(elevation))` - elevation in meters
    /// - `Ok(None)` - void data or no tile for these coordinates
    /// - `Err(...)` - corrupt tile data
    pub fn get_elevation(&self, lat: f64, lon: f64, approximate: bool) -> Result<Option<f64>> {
        self.registry.elevation_at(lat, lon, approximate)
    }

    /// Get the exact grid sample for the given coordinates.
    pub fn get_elevation_exact(&self, lat: f64, lon: f64) -> Result<Option<i16>> {
        self.registry.exact_elevation_at(lat, lon)
    }

    /// Get elevations for a batch of `(lat, lon)` coordinates.
    ///
    /// Returns one entry per input coordinate. Errors are logged and reported
    /// as `None` so one corrupt tile does not sink the whole batch.
    pub fn get_elevations_batch(&self, coords: &[(f64, f64)], approximate: bool) -> Vec<Option<f64>> {
        coords
            .iter()
            .map(|&(lat, lon)| {
                self.get_elevation(lat, lon, approximate)
                    .unwrap_or_else(|e| {
                        tracing::warn!(lat, lon, error = %e, "Elevation query failed");
                        None
                    })
            })
            .collect()
    }

    /// Load tiles into memory, optionally only those overlapping `bounds`.
    pub fn preload(&self, bounds: Option<&[BoundingBox]>) -> PreloadStats {
        self.registry.source().preload(bounds)
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.registry.source().cache_stats()
    }

    /// Get the maximum cache size.
    pub fn cache_capacity(&self) -> u64 {
        self.registry.source().cache_capacity()
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        self.registry.source().data_dir()
    }

    /// The load policy in use.
    pub fn load_policy(&self) -> LoadPolicy {
        self.registry.source().policy()
    }

    /// Tile files available in the data directory.
    pub fn scan_tile_files(&self) -> Vec<String> {
        self.registry.source().scan_tile_files()
    }

    /// The registry answering queries.
    pub fn registry(&self) -> &TileRegistry<DirectoryTileStore> {
        &self.registry
    }
}

/// Builder for creating [`ElevationService`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use geoelev::{ElevationServiceBuilder, LoadPolicy};
///
/// let service = ElevationServiceBuilder::new("/data/srtm")
///     .cache_size(100)
///     .load_policy(LoadPolicy::Eager)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ElevationServiceBuilder {
    data_dir: PathBuf,
    cache_size: u64,
    load_policy: LoadPolicy,
}

impl ElevationServiceBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cache_size: DEFAULT_CACHE_SIZE,
            load_policy: LoadPolicy::Lazy,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GEOELEV_DATA_DIR` | Directory containing .hgt files | Required |
    /// | `GEOELEV_CACHE_SIZE` | Maximum lazily cached tiles | 100 |
    /// | `GEOELEV_PRELOAD` | `true`, `1` or `eager` to load every tile at startup | lazy |
    ///
    /// # Errors
    ///
    /// Returns an error if `GEOELEV_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("GEOELEV_DATA_DIR").map_err(|_| {
            ElevationError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "GEOELEV_DATA_DIR environment variable not set",
            ))
        })?;

        let cache_size: u64 = std::env::var("GEOELEV_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);

        let load_policy = std::env::var("GEOELEV_PRELOAD")
            .map(|v| parse_load_policy(&v))
            .unwrap_or_default();

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            cache_size,
            load_policy,
        })
    }

    /// Set the data directory.
    ///
    /// Overrides the directory set in the constructor or from environment.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the maximum number of lazily cached tiles.
    ///
    /// Default is 100 tiles.
    pub fn cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    /// Choose between loading every tile up front and loading on demand.
    pub fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    /// Build the [`ElevationService`].
    ///
    /// In eager mode this maps every tile in the directory before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::DataDirNotFound`] if the directory does not exist.
    pub fn build(self) -> Result<ElevationService> {
        if !self.data_dir.is_dir() {
            return Err(ElevationError::DataDirNotFound {
                path: self.data_dir,
            });
        }

        let store = DirectoryTileStore::new(&self.data_dir, self.cache_size, self.load_policy);
        Ok(ElevationService {
            registry: TileRegistry::new(store),
        })
    }
}

/// Interpret a `GEOELEV_PRELOAD`-style flag.
pub fn parse_load_policy(value: &str) -> LoadPolicy {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "eager" | "yes" => LoadPolicy::Eager,
        _ => LoadPolicy::Lazy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// File size for SRTM3 (1201 × 1201 × 2 bytes)
    const SRTM3_SIZE: usize = 1201 * 1201 * 2;
    const SRTM3_SAMPLES: usize = 1201;

    /// Create a test SRTM3 file with elevation = `center_elevation` at the center
    fn create_test_tile(dir: &Path, filename: &str, center_elevation: i16) {
        let mut data = vec![0u8; SRTM3_SIZE];

        let center_offset = (600 * SRTM3_SAMPLES + 600) * 2;
        data[center_offset..center_offset + 2].copy_from_slice(&center_elevation.to_be_bytes());

        fs::write(dir.join(filename), data).unwrap();
    }

    #[test]
    fn test_service_basic() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);

        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        assert_eq!(service.get_elevation(35.5, 138.5, false).unwrap(), Some(500.0));
        assert_eq!(service.get_elevation_exact(35.5, 138.5).unwrap(), Some(500));
    }

    #[test]
    fn test_missing_data_dir() {
        let result = ElevationService::new("/definitely/not/a/real/dir", 10);
        assert!(matches!(result, Err(ElevationError::DataDirNotFound { .. })));
    }

    #[test]
    fn test_missing_tile_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        assert_eq!(service.get_elevation(50.0, 50.0, false).unwrap(), None);
        assert_eq!(service.get_elevation(50.0, 50.0, true).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_coordinates_are_none() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N44W072.hgt", 759);
        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        assert_eq!(service.get_elevation(44.1, 191.1, false).unwrap(), None);
        assert_eq!(service.get_elevation(95.0, 0.0, true).unwrap(), None);
    }

    #[test]
    fn test_cache_hit() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);

        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        service.get_elevation(35.5, 138.5, false).unwrap();
        let stats = service.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 0);

        service.get_elevation(35.6, 138.6, false).unwrap();
        let stats = service.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
    }

    #[test]
    fn test_eager_policy() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);
        create_test_tile(temp_dir.path(), "N36E138.hgt", 1000);

        let service = ElevationService::builder(temp_dir.path())
            .load_policy(LoadPolicy::Eager)
            .build()
            .unwrap();

        assert_eq!(service.load_policy(), LoadPolicy::Eager);
        assert_eq!(service.cache_stats().entry_count, 2);
        assert_eq!(service.get_elevation(36.5, 138.5, false).unwrap(), Some(1000.0));
        assert_eq!(service.cache_stats().miss_count, 0);
    }

    #[test]
    fn test_get_elevations_batch() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);
        fs::write(temp_dir.path().join("N10E010.hgt"), vec![0u8; 1001]).unwrap();

        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        let coords = vec![
            (35.5, 138.5), // center = 500
            (50.0, 50.0),  // missing tile
            (35.1, 138.1), // zero-filled data
            (10.5, 10.5),  // corrupt tile
        ];
        let results = service.get_elevations_batch(&coords, false);

        assert_eq!(results, vec![Some(500.0), None, Some(0.0), None]);
    }

    #[test]
    fn test_get_elevations_batch_approximate() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tile(temp_dir.path(), "N35E138.hgt", 500);

        let service = ElevationService::new(temp_dir.path(), 10).unwrap();

        let results = service.get_elevations_batch(&[(35.3, 138.3), (50.0, 50.0)], true);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Some(0.0));
        assert_eq!(results[1], None);
    }

    #[test]
    fn test_parse_load_policy() {
        assert_eq!(parse_load_policy("true"), LoadPolicy::Eager);
        assert_eq!(parse_load_policy(" EAGER "), LoadPolicy::Eager);
        assert_eq!(parse_load_policy("1"), LoadPolicy::Eager);
        assert_eq!(parse_load_policy("false"), LoadPolicy::Lazy);
        assert_eq!(parse_load_policy(""), LoadPolicy::Lazy);
    }

    #[test]
    fn test_from_env() {
        let temp_dir = TempDir::new().unwrap();

        let orig_dir = std::env::var("GEOELEV_DATA_DIR").ok();
        let orig_size = std::env::var("GEOELEV_CACHE_SIZE").ok();
        let orig_preload = std::env::var("GEOELEV_PRELOAD").ok();

        std::env::remove_var("GEOELEV_DATA_DIR");
        assert!(ElevationServiceBuilder::from_env().is_err());

        std::env::set_var("GEOELEV_DATA_DIR", temp_dir.path());
        std::env::remove_var("GEOELEV_CACHE_SIZE");
        std::env::remove_var("GEOELEV_PRELOAD");
        let builder = ElevationServiceBuilder::from_env().unwrap();
        assert_eq!(builder.data_dir, temp_dir.path());
        assert_eq!(builder.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(builder.load_policy, LoadPolicy::Lazy);

        std::env::set_var("GEOELEV_CACHE_SIZE", "50");
        std::env::set_var("GEOELEV_PRELOAD", "true");
        let builder = ElevationServiceBuilder::from_env().unwrap();
        assert_eq!(builder.cache_size, 50);
        assert_eq!(builder.load_policy, LoadPolicy::Eager);

        for (name, value) in [
            ("GEOELEV_DATA_DIR", orig_dir),
            ("GEOELEV_CACHE_SIZE", orig_size),
            ("GEOELEV_PRELOAD", orig_preload),
        ] {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }
}
