use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use shared::{
    ApiError, BoundingBox, DecodePolylineRequest, DecodePolylineResponse, Difficulty,
    EncodePolylineRequest, EncodePolylineResponse, GeoPoint, GeohashLevels, GeohashRequest,
    GeohashResponse, TrailStats, TrailStatsRequest, TrailStatsResponse,
};

use crate::category::CategoryInfo;

/// Place record as stored in the document store, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDocument {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    pub category: String,
    #[serde(flatten)]
    pub taxonomy: CategoryInfo,
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    pub geohash: String,
    pub geohashes: GeohashLevels,
    pub quality_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub osm_id: i64,
    pub osm_type: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEndpoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

/// Trail record: derived statistics plus the encoded geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailDocument {
    pub id: String,
    pub name: String,
    pub osm_id: i64,
    pub osm_type: String,
    pub distance_km: f64,
    pub duration_hours: f64,
    pub elevation_gain_m: f64,
    pub difficulty: Difficulty,
    pub start: TrailEndpoint,
    pub end: TrailEndpoint,
    pub polyline_encoded: String,
    /// Sampled geometry as `[lat, lng, lat, lng, ...]`.
    pub polyline: Vec<f64>,
    pub polyline_points: usize,
    pub polyline_preview: Vec<GeoPoint>,
    pub surface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sac_scale: Option<String>,
    pub region: String,
    pub geohash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fetched_at: String,
}
