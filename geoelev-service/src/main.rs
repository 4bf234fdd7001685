//! geoelev-service - HTTP microservice for SRTM elevation queries.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GEOELEV_DATA_DIR` | Directory containing .hgt files | current directory |
//! | `GEOELEV_CACHE_SIZE` | Maximum lazily cached tiles | 100 |
//! | `GEOELEV_PRELOAD` | `true`, `1` or `eager` to load every tile at startup | lazy |
//! | `GEOELEV_WARM_BOUNDS` | `min_lat,min_lon,max_lat,max_lon[;...]` tiles to cache at startup | None |
//! | `GEOELEV_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /elevation?lat=X&lon=Y&approximate=B` - Elevation at coordinates
//! - `POST /elevation` - Batch elevation query
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use geoelev::{ElevationServiceBuilder, LoadPolicy};
use geoelev_service::{app, parse_bounds, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoelev_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("GEOELEV_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // GEOELEV_DATA_DIR, GEOELEV_CACHE_SIZE and GEOELEV_PRELOAD are read by the library
    let builder = match ElevationServiceBuilder::from_env() {
        Ok(builder) => builder,
        Err(_) => {
            tracing::warn!("GEOELEV_DATA_DIR not set, using current directory");
            ElevationServiceBuilder::new(".")
        }
    };
    let service = builder.build()?;

    tracing::info!(
        data_dir = %service.data_dir().display(),
        cache_capacity = service.cache_capacity(),
        load_policy = ?service.load_policy(),
        port = port,
        "Starting geoelev service"
    );

    if service.load_policy() == LoadPolicy::Lazy {
        if let Some(bounds) = std::env::var("GEOELEV_WARM_BOUNDS")
            .ok()
            .and_then(|v| parse_bounds(&v))
        {
            tracing::info!(boxes = bounds.len(), "Warming tile cache");
            let stats = service.preload(Some(&bounds));
            tracing::info!(
                tiles_loaded = stats.tiles_loaded,
                tiles_already_cached = stats.tiles_already_cached,
                tiles_failed = stats.tiles_failed,
                tiles_matched = stats.tiles_matched,
                elapsed_ms = stats.elapsed_ms,
                "Warm-up complete"
            );
        }
    }

    let state = Arc::new(AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
