use anyhow::{bail, Context, Result};
use geoelev::filename::filename_to_lat_lon;
use geoelev::{DirectoryTileStore, LoadPolicy, SrtmResolution, Tile, TileBytes, TileKey, TileSource};
use std::path::PathBuf;

use super::{format_coverage, format_size, ServiceOptions};

/// Summary of the samples in one tile.
#[derive(Debug, Default, PartialEq)]
struct SampleSummary {
    min: Option<i16>,
    max: Option<i16>,
    void_count: u64,
}

pub fn run(
    options: &ServiceOptions,
    tile: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<()> {
    let (tile, source) = match (tile, lat, lon) {
        (_, Some(lat), Some(lon)) => {
            let key = TileKey::for_coords(lat, lon);
            load_from_data_dir(options, key)?
        }
        (Some(tile), _, _) if tile.to_lowercase().ends_with(".hgt") => {
            let path = PathBuf::from(&tile);
            if !path.exists() {
                bail!("Tile not found: {}", path.display());
            }
            let (lat, lon) = filename_to_lat_lon(&tile)
                .with_context(|| format!("Not a tile file name: {}", tile))?;
            let bytes = TileBytes::map_file(&path).context("Failed to load tile")?;
            let tile = Tile::new(TileKey::new(lat, lon), bytes).context("Failed to load tile")?;
            (tile, path)
        }
        (Some(tile), _, _) => {
            let (lat, lon) = filename_to_lat_lon(&tile)
                .with_context(|| format!("Not a tile name: {}", tile))?;
            load_from_data_dir(options, TileKey::new(lat, lon))?
        }
        _ => bail!("Give a tile name or both --lat and --lon"),
    };

    let summary = summarize(&tile)?;
    let key = tile.key();
    let side = tile.side();

    let resolution_str = match tile.resolution() {
        Some(SrtmResolution::Srtm1) => "SRTM1 (~30m)",
        Some(SrtmResolution::Srtm3) => "SRTM3 (~90m)",
        None => "custom",
    };

    println!("Tile: {}", tile.file_name());
    println!("Source: {}", source.display());
    println!();
    println!("Resolution: {} ({}x{} samples)", resolution_str, side, side);
    println!("Coverage: {}", format_coverage(key.lat, key.lon));
    println!("Size: {}", format_size(tile.byte_len() as u64));
    println!();

    if let (Some(min), Some(max)) = (summary.min, summary.max) {
        println!("Min elevation: {}m", min);
        println!("Max elevation: {}m", max);
    }

    if summary.void_count > 0 {
        let total = (side * side) as f64;
        let void_pct = (summary.void_count as f64 / total) * 100.0;
        println!("Void samples: {} ({:.1}%)", summary.void_count, void_pct);
    }

    Ok(())
}

/// Fetch a tile by key from the data directory, `.hgt.zip` included.
fn load_from_data_dir(options: &ServiceOptions, key: TileKey) -> Result<(Tile, PathBuf)> {
    let dir = options.data_dir()?;
    let store = DirectoryTileStore::new(&dir, 1, LoadPolicy::Lazy);

    let Some(bytes) = store.lookup(&key) else {
        bail!("Tile not found: {}", dir.join(key.file_name()).display());
    };
    let tile = Tile::new(key, bytes).context("Failed to load tile")?;

    Ok((tile, dir.join(key.file_name())))
}

fn summarize(tile: &Tile) -> Result<SampleSummary> {
    let mut summary = SampleSummary::default();

    for row in 0..tile.side() {
        for col in 0..tile.side() {
            match tile.sample(row, col)? {
                Some(value) => {
                    summary.min = Some(summary.min.map_or(value, |m| m.min(value)));
                    summary.max = Some(summary.max.map_or(value, |m| m.max(value)));
                }
                None => summary.void_count += 1,
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoelev::VOID_VALUE;

    fn tile_from_fn(side: usize, f: impl Fn(usize, usize) -> i16) -> Tile {
        let mut data = vec![0u8; side * side * 2];
        for row in 0..side {
            for col in 0..side {
                let offset = (row * side + col) * 2;
                data[offset..offset + 2].copy_from_slice(&f(row, col).to_be_bytes());
            }
        }
        Tile::new(TileKey::new(47, 13), data.into()).unwrap()
    }

    #[test]
    fn test_summary_skips_voids() {
        let tile = tile_from_fn(5, |row, col| match (row, col) {
            (0, 0) => VOID_VALUE,
            (4, 4) => 12000,
            _ => (row * 10 + col) as i16,
        });

        let summary = summarize(&tile).unwrap();
        assert_eq!(summary.min, Some(1));
        assert_eq!(summary.max, Some(43));
        assert_eq!(summary.void_count, 2);
    }

    #[test]
    fn test_summary_of_all_void_tile() {
        let tile = tile_from_fn(3, |_, _| VOID_VALUE);

        let summary = summarize(&tile).unwrap();
        assert_eq!(
            summary,
            SampleSummary {
                min: None,
                max: None,
                void_count: 9
            }
        );
    }
}
