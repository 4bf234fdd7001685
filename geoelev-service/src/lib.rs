//! geoelev service library
//!
//! HTTP handlers, router and OpenAPI description for the elevation service.
//! Used by both the `geoelev-service` binary and the integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use geoelev::{BoundingBox, ElevationService};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Elevation service answering every query.
    pub service: ElevationService,
}

// Re-export commonly used types for convenience
pub use handlers::{
    BatchElevationRequest, BatchElevationResponse, ElevationQuery, ElevationResponse,
    ErrorResponse, HealthResponse, PointElevation, StatsResponse,
};

/// OpenAPI documentation for the elevation service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "geoelev Elevation Service",
        version = "0.1.0",
        description = "REST API for querying ground elevation from SRTM .hgt tiles.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_elevation,
        handlers::post_elevation,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::ElevationResponse,
            handlers::BatchElevationRequest,
            handlers::BatchElevationResponse,
            handlers::PointElevation,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "elevation", description = "Elevation query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// API routes without documentation or middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/elevation",
            get(handlers::get_elevation).post(handlers::post_elevation),
        )
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}

/// Full application: API routes, Swagger UI at `/docs`, tracing and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router(state))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
}

/// Parse a list of bounding boxes used to warm the tile cache.
///
/// Format: `min_lat,min_lon,max_lat,max_lon`, several boxes separated by `;`.
/// Malformed boxes are skipped with a warning; `None` if none parse.
pub fn parse_bounds(value: &str) -> Option<Vec<BoundingBox>> {
    let boxes: Vec<BoundingBox> = value
        .trim()
        .split(';')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|bbox_str| {
            let parts: Vec<f64> = bbox_str
                .split(',')
                .filter_map(|s| s.trim().parse::<f64>().ok())
                .collect();
            if parts.len() == 4 {
                Some(BoundingBox::new(parts[0], parts[1], parts[2], parts[3]))
            } else {
                tracing::warn!(
                    bbox = bbox_str,
                    "Invalid bounding box format, expected min_lat,min_lon,max_lat,max_lon"
                );
                None
            }
        })
        .collect();

    (!boxes.is_empty()).then_some(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_box() {
        let boxes = parse_bounds("44.0,-72.0,45.0,-71.0").unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].min_lat, 44.0);
        assert_eq!(boxes[0].max_lon, -71.0);
    }

    #[test]
    fn test_parse_multiple_boxes_skips_bad_ones() {
        let boxes = parse_bounds("44,-72,45,-71; nonsense ;47,13,48,14;").unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[1].min_lat, 47.0);
    }

    #[test]
    fn test_parse_nothing_valid() {
        assert!(parse_bounds("").is_none());
        assert!(parse_bounds("1,2,3").is_none());
    }
}
