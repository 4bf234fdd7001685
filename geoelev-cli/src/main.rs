use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// SRTM elevation data CLI tool
#[derive(Parser)]
#[command(name = "geoelev")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing .hgt files
    #[arg(short, long, env = "GEOELEV_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Maximum tiles in cache
    #[arg(
        short,
        long,
        env = "GEOELEV_CACHE_SIZE",
        default_value = "100",
        global = true
    )]
    cache_size: u64,

    /// Load every tile at startup instead of on first use
    #[arg(short, long, global = true)]
    preload: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation for a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Blend the four neighbouring samples instead of reading one
        #[arg(short, long)]
        approximate: bool,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an elevation column to every row of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_elevation.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Blend the four neighbouring samples instead of reading one
        #[arg(short, long)]
        approximate: bool,
    },

    /// Display information about an SRTM tile
    Info {
        /// Path to .hgt file, or tile name (e.g., N35E138)
        #[arg(required_unless_present_all = ["lat", "lon"])]
        tile: Option<String>,

        /// Specify tile by latitude instead of filename
        #[arg(long, allow_hyphen_values = true, conflicts_with = "tile", requires = "lon")]
        lat: Option<f64>,

        /// Specify tile by longitude instead of filename
        #[arg(long, allow_hyphen_values = true, conflicts_with = "tile", requires = "lat")]
        lon: Option<f64>,
    },

    /// List available SRTM tiles
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = commands::ServiceOptions {
        data_dir: cli.data_dir,
        cache_size: cli.cache_size,
        preload: cli.preload,
    };

    match cli.command {
        Commands::Query {
            lat,
            lon,
            approximate,
            json,
        } => commands::query::run(&options, lat, lon, approximate, json),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
            approximate,
        } => commands::batch::run(&options, input, output, &lat_col, &lon_col, approximate),
        Commands::Info { tile, lat, lon } => commands::info::run(&options, tile, lat, lon),
        Commands::List => commands::list::run(&options),
    }
}
