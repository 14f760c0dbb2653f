use thiserror::Error;

/// Input-contract violations of the geospatial codecs and trail statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid coordinate (lat={lat}, lon={lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("geohash precision must be between 1 and {max}, got {precision}")]
    InvalidPrecision { precision: usize, max: usize },
    #[error("invalid geohash character {character:?} at position {position}")]
    InvalidGeohash { position: usize, character: char },
    #[error("malformed polyline at byte {position}: {reason}")]
    MalformedPolyline { position: usize, reason: &'static str },
    #[error("assumed speed must be a positive finite number of km/h, got {0}")]
    InvalidSpeed(f64),
    #[error("distance must be a non-negative finite number of km, got {0}")]
    InvalidDistance(f64),
    #[error("elevation gain must be a non-negative finite number of meters, got {0}")]
    InvalidElevationGain(f64),
    #[error("trail has no points")]
    EmptyTrail,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
