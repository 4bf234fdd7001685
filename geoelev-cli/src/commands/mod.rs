use anyhow::{Context, Result};
use geoelev::{ElevationService, ElevationServiceBuilder, LoadPolicy};
use std::path::PathBuf;

pub mod batch;
pub mod info;
pub mod list;
pub mod query;

const MISSING_DATA_DIR: &str =
    "GEOELEV_DATA_DIR environment variable not set. Use --data-dir or set GEOELEV_DATA_DIR";

/// Global options shared by every subcommand.
pub struct ServiceOptions {
    pub data_dir: Option<PathBuf>,
    pub cache_size: u64,
    pub preload: bool,
}

impl ServiceOptions {
    /// Directory holding the tiles.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::var("GEOELEV_DATA_DIR")
                .map(PathBuf::from)
                .context(MISSING_DATA_DIR),
        }
    }

    /// Build an [`ElevationService`] from the command-line options.
    pub fn build_service(&self) -> Result<ElevationService> {
        let policy = if self.preload {
            LoadPolicy::Eager
        } else {
            LoadPolicy::Lazy
        };

        ElevationServiceBuilder::new(self.data_dir()?)
            .cache_size(self.cache_size)
            .load_policy(policy)
            .build()
            .context("Failed to create elevation service")
    }
}

/// Render an elevation the way every subcommand prints it.
pub fn format_elevation(elevation: Option<f64>, approximate: bool) -> String {
    match elevation {
        None => "void".to_string(),
        Some(e) if approximate => format!("{:.2}", e),
        Some(e) => format!("{}", e as i16),
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// `N47 to N48, E013 to E014` style coverage for a tile anchored at
/// `(lat, lon)`.
pub fn format_coverage(lat: i32, lon: i32) -> String {
    fn lat_label(lat: i32) -> String {
        format!("{}{:02}", if lat >= 0 { "N" } else { "S" }, lat.unsigned_abs())
    }
    fn lon_label(lon: i32) -> String {
        format!("{}{:03}", if lon >= 0 { "E" } else { "W" }, lon.unsigned_abs())
    }

    format!(
        "{} to {}, {} to {}",
        lat_label(lat),
        lat_label(lat + 1),
        lon_label(lon),
        lon_label(lon + 1)
    )
}
