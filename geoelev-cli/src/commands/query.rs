use anyhow::{Context, Result};
use serde::Serialize;

use super::{format_elevation, ServiceOptions};

#[derive(Serialize)]
struct ElevationResponse {
    lat: f64,
    lon: f64,
    elevation: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    approximate: bool,
}

pub fn run(options: &ServiceOptions, lat: f64, lon: f64, approximate: bool, json: bool) -> Result<()> {
    let service = options.build_service()?;

    let elevation = service
        .get_elevation(lat, lon, approximate)
        .context("Failed to get elevation")?;

    if json {
        let response = ElevationResponse {
            lat,
            lon,
            elevation,
            approximate,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", format_elevation(elevation, approximate));
    }

    Ok(())
}
