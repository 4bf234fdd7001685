//! Tile registry: resolves coordinates to tiles and dispatches queries.
//!
//! The registry does no I/O of its own. It asks a [`TileSource`] for the
//! bytes of a tile and samples them; whether those bytes were loaded at
//! startup or on first use is the source's business.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::filename::TileKey;
use crate::tile::{ExactLookup, Tile, TileBytes};

/// Supplies the bytes of available tiles.
pub trait TileSource: Send + Sync {
    /// Bytes of the tile identified by `key`, or `None` if it is not
    /// available.
    fn lookup(&self, key: &TileKey) -> Option<TileBytes>;
}

impl<S: TileSource + ?Sized> TileSource for &S {
    fn lookup(&self, key: &TileKey) -> Option<TileBytes> {
        (**self).lookup(key)
    }
}

impl<S: TileSource + ?Sized> TileSource for std::sync::Arc<S> {
    fn lookup(&self, key: &TileKey) -> Option<TileBytes> {
        (**self).lookup(key)
    }
}

/// In-memory tile source populated by the caller.
///
/// Entries are only ever added. A concurrent reader either sees a complete
/// tile or no tile at all.
///
/// # Example
///
/// ```
/// use geoelev::{MemoryTileStore, TileRegistry};
///
/// let store = MemoryTileStore::new();
/// store.insert_named("N47E013.hgt", vec![0u8; 11 * 11 * 2].into()).unwrap();
///
/// let registry = TileRegistry::new(store);
/// assert_eq!(registry.elevation_at(47.5, 13.5, false).unwrap(), Some(0.0));
/// assert_eq!(registry.elevation_at(44.1, 191.1, false).unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    tiles: RwLock<HashMap<TileKey, TileBytes>>,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tile.
    pub fn insert(&self, key: TileKey, bytes: TileBytes) {
        self.tiles
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, bytes);
    }

    /// Add a tile by its file name.
    ///
    /// # Errors
    ///
    /// [`crate::ElevationError::MalformedKey`] if `file_name` is not a tile name.
    pub fn insert_named(&self, file_name: &str, bytes: TileBytes) -> Result<TileKey> {
        let key = TileKey::parse(file_name)?;
        self.insert(key, bytes);
        Ok(key)
    }

    /// Number of tiles in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Keys of all stored tiles, sorted.
    pub fn keys(&self) -> Vec<TileKey> {
        let mut keys: Vec<TileKey> = self.read().keys().copied().collect();
        keys.sort();
        keys
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TileKey, TileBytes>> {
        self.tiles
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TileSource for MemoryTileStore {
    fn lookup(&self, key: &TileKey) -> Option<TileBytes> {
        self.read().get(key).cloned()
    }
}

/// Resolves coordinates to tiles and answers elevation queries.
///
/// Nothing is cached here: each query looks the tile up again and decodes
/// the sample from its bytes.
#[derive(Debug)]
pub struct TileRegistry<S> {
    source: S,
}

impl<S: TileSource> TileRegistry<S> {
    /// Create a registry over `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying tile source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Tile covering `(lat, lon)`, if its bytes are available.
    ///
    /// # Errors
    ///
    /// [`crate::ElevationError::CorruptTile`] if the bytes are not a square grid.
    pub fn tile(&self, lat: f64, lon: f64) -> Result<Option<Tile>> {
        if !lat.is_finite() || !lon.is_finite() {
            return Ok(None);
        }

        let key = TileKey::for_coords(lat, lon);
        match self.source.lookup(&key) {
            Some(bytes) => Tile::new(key, bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Exact elevation at `(lat, lon)` in metres.
    ///
    /// Returns `Ok(None)` when no tile covers the point or the sample is void.
    pub fn exact_elevation_at(&self, lat: f64, lon: f64) -> Result<Option<i16>> {
        match self.tile(lat, lon)? {
            Some(tile) => tile.exact_elevation(lat, lon),
            None => Ok(None),
        }
    }

    /// Interpolated elevation at `(lat, lon)` in metres.
    ///
    /// Neighbouring samples may come from adjacent tiles. Returns `Ok(None)`
    /// when no tile covers the point, or when the point and a neighbour are
    /// both void.
    pub fn interpolated_elevation_at(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        match self.tile(lat, lon)? {
            Some(tile) => tile.interpolated_elevation(lat, lon, self),
            None => Ok(None),
        }
    }

    /// Elevation at `(lat, lon)`: interpolated if `approximate`, otherwise the
    /// exact grid sample.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(elevation))` - elevation in meters
    /// - `Ok(None)` - no tile covers the point, or the data is void
    /// - `Err(...)` - corrupt tile data
    pub fn elevation_at(&self, lat: f64, lon: f64, approximate: bool) -> Result<Option<f64>> {
        if approximate {
            self.interpolated_elevation_at(lat, lon)
        } else {
            Ok(self.exact_elevation_at(lat, lon)?.map(f64::from))
        }
    }
}

impl<S: TileSource> ExactLookup for TileRegistry<S> {
    fn exact_elevation_at(&self, lat: f64, lon: f64) -> Result<Option<i16>> {
        TileRegistry::exact_elevation_at(self, lat, lon)
    }
}
