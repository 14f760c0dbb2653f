pub mod category;
pub mod checkpoint;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geohash;
pub mod gpx_export;
pub mod models;
pub mod overpass;
pub mod polyline;
pub mod region;
pub mod retry;
pub mod trail;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::geohash::{cell_bounds, encode_geohash, geohash_levels};
use crate::models::{
    ApiError, DecodePolylineRequest, DecodePolylineResponse, EncodePolylineRequest,
    EncodePolylineResponse, GeoPoint, GeohashRequest, GeohashResponse, TrailStatsRequest,
    TrailStatsResponse,
};
use crate::polyline::{decode_polyline, encode_polyline};
use crate::trail::Trail;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/geohash", post(geohash_handler))
        .route("/api/polyline/encode", post(encode_handler))
        .route("/api/polyline/decode", post(decode_handler))
        .route("/api/trail/stats", post(trail_stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn geohash_handler(
    State(state): State<AppState>,
    Json(req): Json<GeohashRequest>,
) -> ApiResult<GeohashResponse> {
    let precision = req.precision.unwrap_or(state.config.geohash_precision);
    let geohash = encode_geohash(req.lat, req.lon, precision).map_err(api_error)?;
    let levels = geohash_levels(GeoPoint::new(req.lat, req.lon)).map_err(api_error)?;
    let cell = cell_bounds(&geohash).map_err(api_error)?;

    Ok(Json(GeohashResponse {
        geohash,
        levels,
        cell,
    }))
}

async fn encode_handler(Json(req): Json<EncodePolylineRequest>) -> ApiResult<EncodePolylineResponse> {
    let encoded = encode_polyline(&req.points).map_err(api_error)?;
    Ok(Json(EncodePolylineResponse {
        encoded,
        point_count: req.points.len(),
    }))
}

async fn decode_handler(Json(req): Json<DecodePolylineRequest>) -> ApiResult<DecodePolylineResponse> {
    let points = decode_polyline(&req.encoded).map_err(api_error)?;
    Ok(Json(DecodePolylineResponse { points }))
}

async fn trail_stats_handler(
    State(state): State<AppState>,
    Json(req): Json<TrailStatsRequest>,
) -> ApiResult<TrailStatsResponse> {
    let config = &state.config;
    let trail = Trail::new(req.points).map_err(api_error)?;
    let stats = trail
        .summarize(
            &config.difficulty,
            req.speed_kmh.unwrap_or(config.speed_kmh),
            req.elevation_gain_m,
            req.sac_scale.as_deref(),
        )
        .map_err(api_error)?;
    let gpx_base64 = trail.export_gpx(req.name.as_deref()).map_err(api_error)?;
    tracing::debug!(
        "trail stats: {} points, {:.2} km, {}",
        trail.len(),
        stats.distance_km,
        stats.difficulty
    );

    Ok(Json(TrailStatsResponse {
        stats,
        polyline_encoded: trail.encoded_polyline().map_err(api_error)?,
        preview: trail.preview(),
        bounds: trail.bounds(),
        region: config.regions.detect(trail.start()).to_string(),
        gpx_base64,
    }))
}

fn api_error(err: impl Into<AppError>) -> (StatusCode, Json<ApiError>) {
    let err = err.into();
    let status = match err {
        AppError::Geo(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("request failed: {err}");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
