//! HTTP request handlers for the elevation service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geoelev::ElevationError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the elevation endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ElevationQuery {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Blend the four neighbouring samples instead of returning the grid
    /// sample. Default is false.
    #[serde(default)]
    pub approximate: bool,
}

/// Successful elevation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ElevationResponse {
    /// Elevation in meters. Integral unless `approximate` is set.
    pub elevation: f64,
    /// Latitude queried.
    pub lat: f64,
    /// Longitude queried.
    pub lon: f64,
    /// Whether the value was interpolated.
    pub approximate: bool,
}

/// Batch elevation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchElevationRequest {
    /// Points as `[lat, lon]` pairs.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub points: Vec<[f64; 2]>,
    /// Interpolate every point.
    #[serde(default)]
    pub approximate: bool,
}

/// Elevation of one point in a batch; `null` where there is no data.
#[derive(Debug, Serialize, ToSchema)]
pub struct PointElevation {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
}

/// Batch elevation response, in request order.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchElevationResponse {
    pub results: Vec<PointElevation>,
    pub approximate: bool,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Cache statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of lazily cached tiles.
    pub cached_tiles: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
    /// Maximum number of lazily cached tiles.
    pub cache_capacity: u64,
    /// `eager` or `lazy`.
    pub load_policy: String,
}

/// Get elevation for given coordinates.
///
/// # Returns
///
/// - `200 OK` with elevation data on success
/// - `400 Bad Request` if the coordinates are unusable
/// - `404 Not Found` if no tile covers the point or the data is void
/// - `500 Internal Server Error` on corrupt tiles or I/O failures
#[utoipa::path(
    get,
    path = "/elevation",
    params(ElevationQuery),
    responses(
        (status = 200, description = "Elevation found", body = ElevationResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 404, description = "No elevation data", body = ErrorResponse),
        (status = 500, description = "Tile data unreadable", body = ErrorResponse)
    ),
    tag = "elevation"
)]
pub async fn get_elevation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ElevationQuery>,
) -> Response {
    tracing::debug!(
        lat = query.lat,
        lon = query.lon,
        approximate = query.approximate,
        "Elevation query"
    );

    match state
        .service
        .get_elevation(query.lat, query.lon, query.approximate)
    {
        Ok(Some(elevation)) => {
            tracing::info!(
                lat = query.lat,
                lon = query.lon,
                elevation = elevation,
                approximate = query.approximate,
                "Elevation found"
            );
            (
                StatusCode::OK,
                Json(ElevationResponse {
                    elevation,
                    lat: query.lat,
                    lon: query.lon,
                    approximate: query.approximate,
                }),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No elevation data at {}, {}", query.lat, query.lon),
            }),
        )
            .into_response(),
        Err(e) => error_response(query.lat, query.lon, e),
    }
}

/// Get elevations for many points at once.
///
/// Points without data come back as `null`; the request as a whole only
/// fails if it cannot be parsed.
#[utoipa::path(
    post,
    path = "/elevation",
    request_body = BatchElevationRequest,
    responses(
        (status = 200, description = "Elevations in request order", body = BatchElevationResponse)
    ),
    tag = "elevation"
)]
pub async fn post_elevation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchElevationRequest>,
) -> Json<BatchElevationResponse> {
    let coords: Vec<(f64, f64)> = request.points.iter().map(|p| (p[0], p[1])).collect();

    tracing::debug!(
        points = coords.len(),
        approximate = request.approximate,
        "Batch elevation query"
    );

    let elevations = state
        .service
        .get_elevations_batch(&coords, request.approximate);

    let results = coords
        .into_iter()
        .zip(elevations)
        .map(|((lat, lon), elevation)| PointElevation {
            lat,
            lon,
            elevation,
        })
        .collect();

    Json(BatchElevationResponse {
        results,
        approximate: request.approximate,
    })
}

/// Map a library error to a status code.
pub fn error_status(e: &ElevationError) -> StatusCode {
    match e {
        ElevationError::OutOfBoundsForTile { .. } | ElevationError::MalformedKey { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create an error response for elevation queries.
fn error_response(lat: f64, lon: f64, e: ElevationError) -> Response {
    let status = error_status(&e);

    tracing::warn!(lat = lat, lon = lon, error = %e, "Elevation query failed");

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Tile cache statistics", body = StatsResponse)),
    tag = "system"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.service.cache_stats();

    Json(StatsResponse {
        cached_tiles: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
        cache_capacity: state.service.cache_capacity(),
        load_policy: format!("{:?}", state.service.load_policy()).to_lowercase(),
    })
}
