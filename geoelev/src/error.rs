//! Error types for the geoelev library.
//!
//! Missing data is not an error: an absent tile or an invalid sample is
//! reported as `Ok(None)` by the query functions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when addressing or sampling SRTM tiles.
#[derive(Error, Debug)]
pub enum ElevationError {
    /// A tile name does not match `[NS]dd[EW]ddd.hgt`.
    #[error("Malformed tile key: {key}")]
    MalformedKey { key: String },

    /// The tile buffer is not a square grid, or an index fell outside it.
    #[error("Corrupt tile {file}: {reason}")]
    CorruptTile { file: String, reason: String },

    /// Exact sampling was asked for a coordinate the tile does not cover.
    #[error("Invalid {axis} {value} for file {file}")]
    OutOfBoundsForTile {
        axis: Axis,
        value: f64,
        file: String,
    },

    /// IO error when reading tile files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A `.hgt.zip` archive could not be read.
    #[error("Zip archive error: {0}")]
    Zip(String),

    /// The configured data directory does not exist.
    #[error("Data directory not found: {path}")]
    DataDirNotFound { path: PathBuf },
}

/// Coordinate axis named in [`ElevationError::OutOfBoundsForTile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

impl From<zip::result::ZipError> for ElevationError {
    fn from(e: zip::result::ZipError) -> Self {
        ElevationError::Zip(e.to_string())
    }
}

/// Result type alias using [`ElevationError`].
pub type Result<T> = std::result::Result<T, ElevationError>;
