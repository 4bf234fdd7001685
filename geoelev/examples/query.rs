//! Compare exact and interpolated elevations at a few coordinates.
//!
//! Run with: cargo run --example query -- /path/to/hgt/files

use geoelev::{ElevationError, ElevationService};
use std::env;

fn main() -> Result<(), ElevationError> {
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example query -- /path/to/hgt/files");
        std::process::exit(1);
    });

    let service = ElevationService::new(&data_dir, 10)?;

    let locations = [
        ("Mount Washington, USA", 44.2706, -71.3033),
        ("Grossglockner, Austria", 47.0742, 12.6947),
        ("Mount Fuji, Japan", 35.3606, 138.7274),
    ];

    println!("{:<24} {:>10} {:>14}", "LOCATION", "EXACT", "INTERPOLATED");
    println!("{:-<50}", "");

    for (name, lat, lon) in &locations {
        let exact = service.get_elevation_exact(*lat, *lon)?;
        let approx = service.get_elevation(*lat, *lon, true)?;

        let exact = exact.map_or("void".to_string(), |e| format!("{}m", e));
        let approx = approx.map_or("void".to_string(), |e| format!("{:.2}m", e));
        println!("{:<24} {:>10} {:>14}", name, exact, approx);
    }

    let stats = service.cache_stats();
    println!("\nCache statistics:");
    println!("  Cached tiles: {}", stats.entry_count);
    println!("  Hits: {}", stats.hit_count);
    println!("  Misses: {}", stats.miss_count);
    println!("  Hit rate: {:.1}%", stats.hit_rate() * 100.0);

    Ok(())
}
