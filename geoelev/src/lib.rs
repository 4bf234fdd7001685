//! # geoelev - SRTM elevation lookup
//!
//! Resolves ground elevation for a latitude/longitude pair from SRTM
//! (Shuttle Radar Topography Mission) `.hgt` tiles.
//!
//! ## Features
//!
//! - **Exact sampling**: the grid sample covering a coordinate, as stored
//! - **Interpolation**: distance-weighted blend of the four neighbouring
//!   samples, reaching into adjacent tiles near edges
//! - **Pluggable storage**: tiles come from any [`TileSource`]; a directory
//!   store with eager or lazy (LRU cached, memory-mapped) loading is included
//!
//! ## Quick Start
//!
//! ```ignore
//! use geoelev::ElevationService;
//!
//! let service = ElevationService::new("/data/srtm", 100)?;
//!
//! // Exact grid sample, None over voids or missing tiles
//! let elevation = service.get_elevation(44.1, -71.1, false)?;
//!
//! // Smoothed value from neighbouring samples
//! let smooth = service.get_elevation(44.1, -71.1, true)?;
//! ```
//!
//! ## SRTM Data Format
//!
//! - Files are named after their southwest corner, e.g. `N47E013.hgt`
//! - Each file is a square grid of `side × side` 16-bit big-endian signed
//!   integers, north row first
//! - SRTM1 uses 3601×3601 samples, SRTM3 1201×1201; other square sizes work too
//! - Samples outside `(-1000, 10000]` (notably -32768) mean "no data"

pub mod error;
pub mod filename;
pub mod registry;
pub mod service;
pub mod store;
pub mod tile;

// Re-export main types at crate root for convenience
pub use error::{Axis, ElevationError, Result};
pub use filename::TileKey;
pub use registry::{MemoryTileStore, TileRegistry, TileSource};
pub use service::{ElevationService, ElevationServiceBuilder};
pub use store::{BoundingBox, CacheStats, DirectoryTileStore, LoadPolicy, PreloadStats};
pub use tile::{ExactLookup, SrtmResolution, Tile, TileBytes, ONE_DEGREE, VOID_VALUE};
