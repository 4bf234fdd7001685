use anyhow::{Context, Result};
use geoelev::ElevationService;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::{format_elevation, ServiceOptions};

pub fn run(
    options: &ServiceOptions,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: &str,
    lon_col: &str,
    approximate: bool,
) -> Result<()> {
    let service = options.build_service()?;

    let file = File::open(&input).context("Failed to open input file")?;
    let output_path = output.unwrap_or_else(|| default_output_path(&input));
    let output_file = File::create(&output_path).context("Failed to create output file")?;

    let rows = process_csv(
        &service,
        BufReader::new(file),
        BufWriter::new(output_file),
        lat_col,
        lon_col,
        approximate,
    )?;

    println!("{} rows written to: {}", rows, output_path.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_elevation.csv", stem))
}

/// Copy `reader` to `writer`, appending an `elevation` column.
///
/// Rows whose coordinates cannot be resolved get `void`. Returns the number
/// of data rows written.
fn process_csv<R: Read, W: Write>(
    service: &ElevationService,
    reader: R,
    writer: W,
    lat_col: &str,
    lon_col: &str,
    approximate: bool,
) -> Result<u64> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut writer = csv::Writer::from_writer(writer);
    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("elevation");
    writer.write_record(&new_headers)?;

    let mut rows = 0u64;
    for (line, record) in records.iter().enumerate() {
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on row {}", line + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on row {}", line + 1))?;

        let elevation = match service.get_elevation(lat, lon, approximate) {
            Ok(elevation) => elevation,
            Err(e) => {
                tracing::warn!(lat, lon, error = %e, "Elevation lookup failed");
                None
            }
        };
        let elevation = format_elevation(elevation, approximate);

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&elevation);
        writer.write_record(&new_record)?;

        rows += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    writer.flush()?;

    Ok(rows)
}
