use anyhow::{bail, Result};
use geoelev::{DirectoryTileStore, LoadPolicy, SrtmResolution, TileKey, TileSource};

use super::{format_coverage, format_size, ServiceOptions};

/// Resolution label for a tile of `byte_len` bytes.
fn classify(byte_len: usize) -> &'static str {
    let side = ((byte_len / 2) as f64).sqrt() as usize;
    if side * side * 2 != byte_len {
        return "???";
    }
    match SrtmResolution::from_side(side) {
        Some(SrtmResolution::Srtm1) => "SRTM1",
        Some(SrtmResolution::Srtm3) => "SRTM3",
        None => "custom",
    }
}

pub fn run(options: &ServiceOptions) -> Result<()> {
    let dir = options.data_dir()?;
    if !dir.is_dir() {
        bail!("Data directory does not exist: {}", dir.display());
    }

    let store = DirectoryTileStore::new(&dir, 1, LoadPolicy::Lazy);
    let tiles = store.scan_tile_files();

    if tiles.is_empty() {
        println!("No .hgt files found in: {}", dir.display());
        return Ok(());
    }

    let mut srtm1_count = 0;
    let mut srtm3_count = 0;
    let mut other_count = 0;
    let mut total_size: u64 = 0;

    println!("{:<12} {:>8} {:>28}", "TILE", "TYPE", "COVERAGE");
    println!("{}", "-".repeat(50));

    for filename in &tiles {
        let Ok(key) = TileKey::parse(filename) else {
            println!("{:<12} {:>8} {:>28}", filename, "???", "Unknown");
            other_count += 1;
            continue;
        };

        let resolution = match store.lookup(&key) {
            Some(bytes) => {
                total_size += bytes.len() as u64;
                classify(bytes.len())
            }
            None => "???",
        };
        match resolution {
            "SRTM1" => srtm1_count += 1,
            "SRTM3" => srtm3_count += 1,
            _ => other_count += 1,
        }

        println!(
            "{:<12} {:>8} {:>28}",
            filename,
            resolution,
            format_coverage(key.lat, key.lon)
        );
    }

    println!();
    println!("Summary:");
    println!("  Total tiles: {}", tiles.len());
    if srtm1_count > 0 {
        println!("  SRTM1 (30m): {}", srtm1_count);
    }
    if srtm3_count > 0 {
        println!("  SRTM3 (90m): {}", srtm3_count);
    }
    if other_count > 0 {
        println!("  Other: {}", other_count);
    }
    println!("  Total size: {}", format_size(total_size));
    println!("  Data directory: {}", dir.display());

    Ok(())
}
