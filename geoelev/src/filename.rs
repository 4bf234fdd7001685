//! Tile addressing: coordinates, tile keys and grid positions.
//!
//! # Filename Format
//!
//! SRTM files follow the naming convention: `{N|S}{lat}{E|W}{lon}.hgt`
//!
//! - Latitude: 2 digits with N/S prefix (e.g., N47, S01)
//! - Longitude: 3 digits with E/W prefix (e.g., E013, W071)
//!
//! The filename represents the **southwest corner** of the 1° × 1° tile.

use std::fmt;
use std::str::FromStr;

use crate::error::{ElevationError, Result};

/// File extension shared by every tile.
pub const TILE_EXTENSION: &str = ".hgt";

/// Identifier of a 1° × 1° tile: the floored degrees of its southwest corner.
///
/// The key only depends on `floor(lat)` and `floor(lon)`; it says nothing
/// about whether the tile actually exists.
///
/// # Examples
///
/// ```
/// use geoelev::filename::TileKey;
///
/// let key = TileKey::for_coords(47.3, 13.07);
/// assert_eq!(key.to_string(), "N47E013.hgt");
/// assert_eq!(key.anchor(), (47.0, 13.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Latitude of the southwest corner.
    pub lat: i32,
    /// Longitude of the southwest corner.
    pub lon: i32,
}

impl TileKey {
    /// Create a key from integer corner degrees.
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Key of the tile containing `(lat, lon)`.
    ///
    /// Coordinates outside the usual ranges still produce a key (for example
    /// longitude 191.1 gives `N44E191.hgt`); such a key simply matches no tile.
    pub fn for_coords(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.floor() as i32,
            lon: lon.floor() as i32,
        }
    }

    /// Parse a bare tile file name such as `N47E013.hgt`.
    ///
    /// The match is strict: upper-case hemisphere letters, exactly two
    /// latitude digits, exactly three longitude digits and the `.hgt`
    /// extension. Anything else is [`ElevationError::MalformedKey`].
    pub fn parse(name: &str) -> Result<Self> {
        let malformed = || ElevationError::MalformedKey {
            key: name.to_string(),
        };

        let stem = name.strip_suffix(TILE_EXTENSION).ok_or_else(malformed)?;
        let bytes = stem.as_bytes();
        if bytes.len() != 7 {
            return Err(malformed());
        }

        let lat_sign = match bytes[0] {
            b'N' => 1,
            b'S' => -1,
            _ => return Err(malformed()),
        };
        let lon_sign = match bytes[3] {
            b'E' => 1,
            b'W' => -1,
            _ => return Err(malformed()),
        };

        let lat = parse_digits(&bytes[1..3]).ok_or_else(malformed)?;
        let lon = parse_digits(&bytes[4..7]).ok_or_else(malformed)?;

        Ok(Self {
            lat: lat * lat_sign,
            lon: lon * lon_sign,
        })
    }

    /// The tile's file name, e.g. `S01W071.hgt`.
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    /// Southwest corner `(lat0, lon0)` in degrees.
    pub fn anchor(&self) -> (f64, f64) {
        (self.lat as f64, self.lon as f64)
    }

    /// Whether `(lat, lon)` falls inside this tile's half-open cell
    /// `[lat0, lat0+1) × [lon0, lon0+1)`.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let (lat0, lon0) = self.anchor();
        (lat0..lat0 + 1.0).contains(&lat) && (lon0..lon0 + 1.0).contains(&lon)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_prefix = if self.lat >= 0 { 'N' } else { 'S' };
        let lon_prefix = if self.lon >= 0 { 'E' } else { 'W' };

        write!(
            f,
            "{}{:02}{}{:03}{}",
            lat_prefix,
            self.lat.unsigned_abs(),
            lon_prefix,
            self.lon.unsigned_abs(),
            TILE_EXTENSION
        )
    }
}

impl FromStr for TileKey {
    type Err = ElevationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_digits(digits: &[u8]) -> Option<i32> {
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        digits
            .iter()
            .fold(0, |acc, d| acc * 10 + i32::from(d - b'0')),
    )
}

/// Convert latitude and longitude to an SRTM `.hgt` filename.
///
/// # Examples
///
/// ```
/// use geoelev::filename::lat_lon_to_filename;
///
/// assert_eq!(lat_lon_to_filename(47.5, 13.5), "N47E013.hgt");
/// assert_eq!(lat_lon_to_filename(-0.5, -70.5), "S01W071.hgt");
/// assert_eq!(lat_lon_to_filename(0.5, -0.5), "N00W001.hgt");
/// ```
pub fn lat_lon_to_filename(lat: f64, lon: f64) -> String {
    TileKey::for_coords(lat, lon).file_name()
}

/// Parse a tile filename or path to extract the base coordinates.
///
/// More forgiving than [`TileKey::parse`]: directories are stripped, the
/// extension is optional and hemisphere letters may be lower case. Used when
/// scanning directories and reading user input.
///
/// # Examples
///
/// ```
/// use geoelev::filename::filename_to_lat_lon;
///
/// assert_eq!(filename_to_lat_lon("N47E013.hgt"), Some((47, 13)));
/// assert_eq!(filename_to_lat_lon("/data/s01w071.hgt"), Some((-1, -71)));
/// assert_eq!(filename_to_lat_lon("N44W072"), Some((44, -72)));
/// assert_eq!(filename_to_lat_lon("invalid"), None);
/// ```
pub fn filename_to_lat_lon(filename: &str) -> Option<(i32, i32)> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let stem = name
        .strip_suffix(TILE_EXTENSION)
        .or_else(|| name.strip_suffix(".HGT"))
        .unwrap_or(name);

    let canonical = format!("{}{}", stem.to_ascii_uppercase(), TILE_EXTENSION);
    TileKey::parse(&canonical).ok().map(|k| (k.lat, k.lon))
}

/// Grid position of `(lat, lon)` within a tile anchored at `anchor` with
/// `side` samples per row.
///
/// Row 0 is the northern edge and column 0 the western edge. The `side - 1`
/// scaling places samples on both edges of the degree, so edge rows and
/// columns are shared with the neighbouring tiles.
///
/// ```
/// use geoelev::filename::row_col_for;
///
/// assert_eq!(row_col_for((47.0, 13.0), 1201, 47.5, 13.5), (600, 600));
/// assert_eq!(row_col_for((47.0, 13.0), 1201, 47.0, 13.0), (1200, 0));
/// ```
pub fn row_col_for(anchor: (f64, f64), side: usize, lat: f64, lon: f64) -> (i64, i64) {
    let (lat0, lon0) = anchor;
    let scale = (side - 1) as f64;

    let row = ((lat0 + 1.0 - lat) * scale).floor() as i64;
    let col = ((lon - lon0) * scale).floor() as i64;

    (row, col)
}
