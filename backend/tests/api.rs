use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use hyper::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;
use trailgeo::{
    AppState,
    config::AppConfig,
    create_router,
    models::{
        ApiError, DecodePolylineResponse, Difficulty, EncodePolylineResponse, GeoPoint,
        GeohashResponse, TrailStatsResponse,
    },
};

fn test_app() -> axum::Router {
    let state = AppState {
        config: Arc::new(AppConfig::default()),
    };
    create_router(state)
}

async fn post(uri: &str, payload: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn geohash_uses_default_precision() {
    let (status, bytes) = post("/api/geohash", json!({"lat": 64.1466, "lng": -21.9426})).await;
    assert_eq!(status, StatusCode::OK);

    let body: GeohashResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.geohash, "ge2kuttch");
    assert_eq!(body.levels.g6, "ge2kut");
    assert_eq!(body.levels.g9, body.geohash);
    assert!(body.cell.contains(GeoPoint::new(64.1466, -21.9426)));
}

#[tokio::test]
async fn geohash_honours_requested_precision() {
    let (status, bytes) = post(
        "/api/geohash",
        json!({"lat": 57.64911, "lon": 10.40744, "precision": 11}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: GeohashResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.geohash, "u4pruydqqvj");
}

#[tokio::test]
async fn geohash_rejects_out_of_range_input() {
    let (status, bytes) = post("/api/geohash", json!({"lat": 91.0, "lon": 0.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(!body.message.is_empty());

    let (status, _) = post(
        "/api/geohash",
        json!({"lat": 64.0, "lon": -21.0, "precision": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn polyline_encode_matches_reference() {
    let (status, bytes) = post(
        "/api/polyline/encode",
        json!({"points": [
            {"lat": 38.5, "lon": -120.2},
            {"lat": 40.7, "lon": -120.95},
            {"lat": 43.252, "lon": -126.453}
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: EncodePolylineResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    assert_eq!(body.point_count, 3);
}

#[tokio::test]
async fn polyline_encode_of_nothing_is_empty() {
    let (status, bytes) = post("/api/polyline/encode", json!({"points": []})).await;
    assert_eq!(status, StatusCode::OK);
    let body: EncodePolylineResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.encoded, "");
    assert_eq!(body.point_count, 0);
}

#[tokio::test]
async fn polyline_decode_round_trips() {
    let (status, bytes) = post(
        "/api/polyline/decode",
        json!({"encoded": "k{rgKz{xyBvgzCw_vB"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: DecodePolylineResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.points.len(), 2);
    assert!((body.points[0].lat - 64.3271).abs() < 1e-9);
    assert!((body.points[1].lon + 19.5117).abs() < 1e-9);
}

#[tokio::test]
async fn polyline_decode_rejects_truncated_input() {
    // '_' carries a continuation bit with nothing after it.
    let (status, bytes) = post("/api/polyline/decode", json!({"encoded": "_p~iF~ps|U_"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("polyline"));
}

#[tokio::test]
async fn trail_stats_summarizes_long_route() {
    let (status, bytes) = post(
        "/api/trail/stats",
        json!({
            "name": "Skógafoss to Gullfoss",
            "points": [
                {"lat": 63.5321, "lon": -19.5117},
                {"lat": 64.3271, "lon": -20.1211}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: TrailStatsResponse = serde_json::from_slice(&bytes).unwrap();
    assert!((body.stats.distance_km - 93.2802).abs() < 1e-3);
    assert!((body.stats.duration_hours - body.stats.distance_km / 4.0).abs() < 1e-9);
    assert_eq!(body.stats.elevation_gain_m, 0.0);
    assert_eq!(body.stats.difficulty, Difficulty::Expert);
    assert_eq!(body.region, "Suðurland");
    assert_eq!(body.preview.len(), 2);
    assert!(!body.polyline_encoded.is_empty());
    assert!(!body.gpx_base64.is_empty());
}

#[tokio::test]
async fn trail_stats_applies_elevation_and_sac_scale() {
    let points = json!([
        {"lat": 64.2669, "lon": -21.6208},
        {"lat": 64.2750, "lon": -21.6150}
    ]);

    let (_, bytes) = post("/api/trail/stats", json!({"points": points})).await;
    let flat: TrailStatsResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(flat.stats.difficulty, Difficulty::Easy);

    let (_, bytes) = post(
        "/api/trail/stats",
        json!({"points": points, "elevation_gain_m": 600.0}),
    )
    .await;
    let climb: TrailStatsResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(climb.stats.difficulty, Difficulty::Moderate);

    let (_, bytes) = post(
        "/api/trail/stats",
        json!({"points": points, "sac_scale": "alpine_hiking"}),
    )
    .await;
    let alpine: TrailStatsResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(alpine.stats.difficulty, Difficulty::Challenging);
}

#[tokio::test]
async fn trail_stats_rejects_bad_input() {
    let (status, _) = post("/api/trail/stats", json!({"points": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        "/api/trail/stats",
        json!({"points": [{"lat": 64.0, "lon": -20.0}], "speed_kmh": 0.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        "/api/trail/stats",
        json!({"points": [{"lat": 64.0, "lon": 200.0}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn polyline_encode_rejects_out_of_range_points() {
    let (status, bytes) = post(
        "/api/polyline/encode",
        json!({"points": [{"lat": 1e300, "lon": 0.0}, {"lat": -1e300, "lon": 0.0}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("invalid coordinate"));
}

#[tokio::test]
async fn polyline_decode_rejects_values_beyond_coordinate_range() {
    for encoded in ["____________G?____________G?", "A?}~~~~~~~~~~~N?"] {
        let (status, _) = post("/api/polyline/decode", json!({ "encoded": encoded })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{encoded}");
    }
}
