//! SRTM tile decoding, exact sampling and neighbour interpolation.
//!
//! This module provides [`Tile`], a read-only view over one tile's bytes, and
//! [`TileBytes`], the shared buffer handed out by tile sources.

use std::fmt;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::{Axis, ElevationError, Result};
use crate::filename::{row_col_for, TileKey};

/// Metres per degree used by the distance approximation.
///
/// This is the flat-earth constant historically used by SRTM tooling, not the
/// true length of a degree. Changing it changes interpolated results.
pub const ONE_DEGREE: f64 = 1000.0 * 10000.8 / 90.0;

/// Value indicating no data (void) in SRTM files.
pub const VOID_VALUE: i16 = -32768;

/// Samples at or below this value are treated as missing.
pub const MIN_VALID_ELEVATION: i16 = -1000;

/// Samples above this value are treated as missing.
pub const MAX_VALID_ELEVATION: i16 = 10000;

/// Rounding allowance, in ulps, when deciding whether an importance is
/// noise.
const IMPORTANCE_NOISE_ULPS: f64 = 8.0;

/// Number of samples per row/column for SRTM1
const SRTM1_SAMPLES: usize = 3601;

/// Number of samples per row/column for SRTM3
const SRTM3_SAMPLES: usize = 1201;

/// Well-known SRTM grid sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrtmResolution {
    /// SRTM1: 1 arc-second (~30m) resolution
    Srtm1,
    /// SRTM3: 3 arc-second (~90m) resolution
    Srtm3,
}

impl SrtmResolution {
    /// Recognise a grid side length.
    pub fn from_side(side: usize) -> Option<Self> {
        match side {
            SRTM1_SAMPLES => Some(SrtmResolution::Srtm1),
            SRTM3_SAMPLES => Some(SrtmResolution::Srtm3),
            _ => None,
        }
    }

    /// Returns the number of samples per row/column for this resolution.
    pub fn samples(&self) -> usize {
        match self {
            SrtmResolution::Srtm1 => SRTM1_SAMPLES,
            SrtmResolution::Srtm3 => SRTM3_SAMPLES,
        }
    }

    /// Returns the approximate resolution in meters.
    pub fn meters(&self) -> f64 {
        match self {
            SrtmResolution::Srtm1 => 30.0,
            SrtmResolution::Srtm3 => 90.0,
        }
    }
}

/// Whether a decoded sample carries elevation data.
///
/// Valid samples lie in `(-1000, 10000]`; everything else, including
/// [`VOID_VALUE`], means "no data".
pub fn is_valid_sample(value: i16) -> bool {
    value > MIN_VALID_ELEVATION && value <= MAX_VALID_ELEVATION
}

/// Approximate distance in metres between two nearby points.
///
/// Equirectangular projection scaled by [`ONE_DEGREE`], good enough for the
/// sub-tile distances used by interpolation.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let coef = lat1.to_radians().cos();
    let x = lat1 - lat2;
    let y = (lon1 - lon2) * coef;

    (x * x + y * y).sqrt() * ONE_DEGREE
}

/// Side length of a square grid of 2-byte samples spanning `len` bytes, or
/// `None` if no such grid with `side >= 2` exists.
pub(crate) fn grid_side(len: usize) -> Option<usize> {
    let cells = len / 2;
    let side = (cells as f64).sqrt().round() as usize;

    (len % 2 == 0 && side >= 2 && side * side == cells).then_some(side)
}

/// The four axis-aligned neighbours of `(lat, lon)` at spacing `d`, in
/// north, south, east, west order.
fn neighbour_points(lat: f64, lon: f64, d: f64) -> [(f64, f64); 4] {
    [(lat + d, lon), (lat - d, lon), (lat, lon + d), (lat, lon - d)]
}

/// Normalised interpolation weights for the north, south, east and west
/// neighbours of `(lat, lon)` in a tile with `side` samples per row.
///
/// A neighbour's importance is `d_m - distance(neighbour, point)` where
/// `d = 1/side` degrees and `d_m = d * ONE_DEGREE`. Negative importances,
/// and positive ones no larger than the rounding error of the computation,
/// are clamped to zero. When every importance is zero the neighbours are
/// weighted equally. The returned weights always sum to 1.
pub fn neighbour_weights(lat: f64, lon: f64, side: usize) -> [f64; 4] {
    let d = 1.0 / side as f64;
    let d_meters = d * ONE_DEGREE;

    // lat ± d and lon ± d round at the magnitude of the coordinate, not of d.
    let noise =
        d_meters * IMPORTANCE_NOISE_ULPS * f64::EPSILON * (1.0 + (lat.abs() + lon.abs()) / d);

    let importances = neighbour_points(lat, lon, d).map(|(nlat, nlon)| {
        let importance = d_meters - distance(nlat, nlon, lat, lon);
        if importance > noise {
            importance
        } else {
            0.0
        }
    });

    let total: f64 = importances.iter().sum();
    if total > 0.0 {
        importances.map(|i| i / total)
    } else {
        [0.25; 4]
    }
}

/// Exact (non-interpolating) elevation lookup across tiles.
///
/// Interpolation asks for its neighbours through this trait. It only offers
/// exact sampling, so a neighbour lookup can never interpolate in turn.
pub trait ExactLookup {
    /// Exact elevation at `(lat, lon)`, or `None` when no tile covers the
    /// point or the sample is void.
    fn exact_elevation_at(&self, lat: f64, lon: f64) -> Result<Option<i16>>;
}

enum TileBuffer {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// Shared, immutable bytes of one tile.
///
/// Cloning is cheap; all clones point at the same buffer. Buffers are either
/// memory-mapped files or owned vectors.
#[derive(Clone)]
pub struct TileBytes(Arc<TileBuffer>);

impl TileBytes {
    /// Memory-map a tile file read-only.
    pub fn map_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;

        // SAFETY: the mapping is read-only and tiles are never rewritten
        // while they are being served.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self(Arc::new(TileBuffer::Mapped(mmap))))
    }
}

impl Deref for TileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self.0.as_ref() {
            TileBuffer::Mapped(mmap) => mmap,
            TileBuffer::Owned(bytes) => bytes,
        }
    }
}

impl From<Vec<u8>> for TileBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::new(TileBuffer::Owned(bytes)))
    }
}

impl fmt::Debug for TileBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0.as_ref() {
            TileBuffer::Mapped(_) => "mapped",
            TileBuffer::Owned(_) => "owned",
        };
        f.debug_struct("TileBytes")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// One SRTM tile: a square grid of big-endian `i16` samples.
///
/// # Example
///
/// ```
/// use geoelev::{Tile, TileKey};
///
/// let side = 11;
/// let mut data = vec![0u8; side * side * 2];
/// data[(4 * side + 5) * 2..][..2].copy_from_slice(&759i16.to_be_bytes());
///
/// let tile = Tile::new(TileKey::new(44, -72), data.into()).unwrap();
/// assert_eq!(tile.exact_elevation(44.55, -71.45).unwrap(), Some(759));
/// ```
#[derive(Debug, Clone)]
pub struct Tile {
    key: TileKey,
    side: usize,
    data: TileBytes,
}

impl Tile {
    /// Wrap a tile's bytes, deriving the grid side from the buffer length.
    ///
    /// # Errors
    ///
    /// [`ElevationError::CorruptTile`] unless the length is `2 * side * side`
    /// for some `side >= 2`.
    pub fn new(key: TileKey, data: TileBytes) -> Result<Self> {
        let Some(side) = grid_side(data.len()) else {
            return Err(ElevationError::CorruptTile {
                file: key.file_name(),
                reason: format!(
                    "{} bytes is not a square grid of 2-byte samples",
                    data.len()
                ),
            });
        };

        Ok(Self { key, side, data })
    }

    /// Load a tile from a `.hgt` file whose name is the tile key.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let key = TileKey::parse(name)?;

        Self::new(key, TileBytes::map_file(path)?)
    }

    /// Read the sample at `(row, col)`; row 0 is the northern edge.
    ///
    /// Returns `None` for samples outside `(-1000, 10000]`.
    ///
    /// # Errors
    ///
    /// [`ElevationError::CorruptTile`] if the position is outside the grid.
    pub fn sample(&self, row: usize, col: usize) -> Result<Option<i16>> {
        let index = row
            .checked_mul(self.side)
            .and_then(|i| i.checked_add(col))
            .filter(|&i| col < self.side && i < self.side * self.side);
        let Some(i) = index else {
            return Err(ElevationError::CorruptTile {
                file: self.key.file_name(),
                reason: format!(
                    "sample ({}, {}) outside {}x{} grid",
                    row, col, self.side, self.side
                ),
            });
        };

        let offset = i * 2;
        let value = i16::from_be_bytes([self.data[offset], self.data[offset + 1]]);

        Ok(is_valid_sample(value).then_some(value))
    }

    /// Elevation of the grid sample covering `(lat, lon)`, without smoothing.
    ///
    /// # Errors
    ///
    /// [`ElevationError::OutOfBoundsForTile`] if the point is not inside this
    /// tile's cell; that means the caller resolved the wrong tile.
    pub fn exact_elevation(&self, lat: f64, lon: f64) -> Result<Option<i16>> {
        self.check_bounds(lat, lon)?;

        let (row, col) = row_col_for(self.anchor(), self.side, lat, lon);
        let (row, col) = match (usize::try_from(row), usize::try_from(col)) {
            (Ok(row), Ok(col)) => (row, col),
            _ => {
                return Err(ElevationError::CorruptTile {
                    file: self.key.file_name(),
                    reason: format!("negative grid position ({}, {})", row, col),
                })
            }
        };

        self.sample(row, col)
    }

    /// Distance-weighted blend of the four axis-aligned neighbours at spacing
    /// `1/side` degrees.
    ///
    /// Neighbours inside this tile are read directly; the others go through
    /// `neighbours`, which usually resolves them in an adjacent tile. Missing
    /// neighbours are replaced by this point's exact elevation. If that is
    /// missing too, the result is `None`.
    ///
    /// # Errors
    ///
    /// [`ElevationError::OutOfBoundsForTile`] if the point is not inside this
    /// tile's cell.
    pub fn interpolated_elevation(
        &self,
        lat: f64,
        lon: f64,
        neighbours: &dyn ExactLookup,
    ) -> Result<Option<f64>> {
        self.check_bounds(lat, lon)?;

        let d = 1.0 / self.side as f64;
        let mut elevations = [None; 4];
        for (slot, (nlat, nlon)) in elevations.iter_mut().zip(neighbour_points(lat, lon, d)) {
            *slot = if self.key.contains(nlat, nlon) {
                self.exact_elevation(nlat, nlon)?
            } else {
                neighbours.exact_elevation_at(nlat, nlon)?
            };
        }

        let elevations = if elevations.iter().any(Option::is_none) {
            let Some(own) = self.exact_elevation(lat, lon)? else {
                return Ok(None);
            };
            elevations.map(|e| e.unwrap_or(own))
        } else {
            elevations.map(|e| e.unwrap_or_default())
        };

        let weights = neighbour_weights(lat, lon, self.side);
        let elevation = weights
            .iter()
            .zip(elevations)
            .map(|(w, e)| w * f64::from(e))
            .sum();

        Ok(Some(elevation))
    }

    fn check_bounds(&self, lat: f64, lon: f64) -> Result<()> {
        let (lat0, lon0) = self.anchor();

        if !(lat0..lat0 + 1.0).contains(&lat) {
            return Err(ElevationError::OutOfBoundsForTile {
                axis: Axis::Latitude,
                value: lat,
                file: self.key.file_name(),
            });
        }
        if !(lon0..lon0 + 1.0).contains(&lon) {
            return Err(ElevationError::OutOfBoundsForTile {
                axis: Axis::Longitude,
                value: lon,
                file: self.key.file_name(),
            });
        }

        Ok(())
    }

    /// The tile's key.
    pub fn key(&self) -> TileKey {
        self.key
    }

    /// The tile's file name, e.g. `N47E013.hgt`.
    pub fn file_name(&self) -> String {
        self.key.file_name()
    }

    /// Southwest corner `(lat0, lon0)`.
    pub fn anchor(&self) -> (f64, f64) {
        self.key.anchor()
    }

    /// Number of samples per row/column.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Known SRTM resolution for this grid size, if any.
    pub fn resolution(&self) -> Option<SrtmResolution> {
        SrtmResolution::from_side(self.side)
    }

    /// Size of the underlying buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
