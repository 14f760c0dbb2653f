use serde::{Deserialize, Serialize};
use shared::{BoundingBox, Difficulty, GeoPoint, TrailStats};

use crate::{
    error::{AppError, GeoError},
    gpx_export::encode_trail_as_gpx,
    polyline::{encode_polyline, polyline_preview},
};

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Constant walking speed used for duration estimates. This is a flat-speed
/// model; Naismith's rule is not applied.
pub const DEFAULT_SPEED_KMH: f64 = 4.0;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = (sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon).min(1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Sum of haversine legs. Fewer than two points is a zero-length trail.
pub fn trail_distance_km(points: &[GeoPoint]) -> Result<f64, GeoError> {
    validate_points(points)?;
    Ok(points.windows(2).map(|w| haversine_km(w[0], w[1])).sum())
}

pub fn estimate_duration_hours(distance_km: f64, speed_kmh: f64) -> Result<f64, GeoError> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return Err(GeoError::InvalidSpeed(speed_kmh));
    }
    Ok(distance_km / speed_kmh)
}

/// Classify with the default threshold table. Negative or non-finite inputs
/// are rejected rather than falling through to a tier.
pub fn classify_difficulty(
    distance_km: f64,
    elevation_gain_m: f64,
) -> Result<Difficulty, GeoError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(GeoError::InvalidDistance(distance_km));
    }
    validate_elevation_gain(elevation_gain_m)?;
    Ok(DifficultyPolicy::default().classify(distance_km, elevation_gain_m))
}

fn validate_elevation_gain(elevation_gain_m: f64) -> Result<(), GeoError> {
    if !elevation_gain_m.is_finite() || elevation_gain_m < 0.0 {
        return Err(GeoError::InvalidElevationGain(elevation_gain_m));
    }
    Ok(())
}

fn validate_points(points: &[GeoPoint]) -> Result<(), GeoError> {
    match points.iter().find(|p| !p.is_valid()) {
        Some(p) => Err(GeoError::InvalidCoordinate {
            lat: p.lat,
            lon: p.lon,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub max_distance_km: f64,
    pub max_elevation_gain_m: f64,
}

impl DifficultyTier {
    fn admits(&self, distance_km: f64, elevation_gain_m: f64) -> bool {
        distance_km < self.max_distance_km && elevation_gain_m < self.max_elevation_gain_m
    }
}

/// Upper limits for the three lower tiers; anything beyond `challenging` is expert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPolicy {
    pub easy: DifficultyTier,
    pub moderate: DifficultyTier,
    pub challenging: DifficultyTier,
}

impl Default for DifficultyPolicy {
    fn default() -> Self {
        Self {
            easy: DifficultyTier {
                max_distance_km: 5.0,
                max_elevation_gain_m: 300.0,
            },
            moderate: DifficultyTier {
                max_distance_km: 15.0,
                max_elevation_gain_m: 800.0,
            },
            challenging: DifficultyTier {
                max_distance_km: 25.0,
                max_elevation_gain_m: 1500.0,
            },
        }
    }
}

impl DifficultyPolicy {
    /// A trail lands in the first tier whose limits it is below on both axes.
    /// Inputs are assumed validated; NaN never fits a tier and lands on expert.
    pub fn classify(&self, distance_km: f64, elevation_gain_m: f64) -> Difficulty {
        [
            (self.easy, Difficulty::Easy),
            (self.moderate, Difficulty::Moderate),
            (self.challenging, Difficulty::Challenging),
        ]
        .into_iter()
        .find(|(tier, _)| tier.admits(distance_km, elevation_gain_m))
        .map(|(_, difficulty)| difficulty)
        .unwrap_or(Difficulty::Expert)
    }

    /// Limits must not shrink from one tier to the next, otherwise a longer
    /// trail could be classified easier than a shorter one.
    pub fn is_ascending(&self) -> bool {
        let tiers = [self.easy, self.moderate, self.challenging];
        tiers.iter().all(|t| {
            !t.max_distance_km.is_nan() && !t.max_elevation_gain_m.is_nan()
        }) && tiers.windows(2).all(|w| {
            w[0].max_distance_km <= w[1].max_distance_km
                && w[0].max_elevation_gain_m <= w[1].max_elevation_gain_m
        })
    }
}

/// Lower bound implied by an OSM `sac_scale` tag.
pub fn sac_scale_floor(sac_scale: &str) -> Option<Difficulty> {
    let sac_scale = sac_scale.to_ascii_lowercase();
    if sac_scale.contains("demanding") || sac_scale.contains("difficult") {
        Some(Difficulty::Expert)
    } else if sac_scale.contains("alpine") || sac_scale.contains("mountain") {
        Some(Difficulty::Challenging)
    } else {
        None
    }
}

/// A validated, immutable polyline. Statistics are derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: Vec<GeoPoint>,
}

impl Trail {
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, GeoError> {
        if points.is_empty() {
            return Err(GeoError::EmptyTrail);
        }
        validate_points(&points)?;
        Ok(Self { points })
    }

    pub fn from_encoded(encoded: &str) -> Result<Self, GeoError> {
        Self::new(crate::polyline::decode_polyline(encoded)?)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distance_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| haversine_km(w[0], w[1]))
            .sum()
    }

    pub fn bounds(&self) -> BoundingBox {
        let init = BoundingBox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        self.points.iter().fold(init, |b, p| BoundingBox {
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
            min_lon: b.min_lon.min(p.lon),
            max_lon: b.max_lon.max(p.lon),
        })
    }

    pub fn encoded_polyline(&self) -> Result<String, GeoError> {
        encode_polyline(&self.points)
    }

    pub fn preview(&self) -> Vec<GeoPoint> {
        polyline_preview(&self.points)
    }

    pub fn summarize(
        &self,
        policy: &DifficultyPolicy,
        speed_kmh: f64,
        elevation_gain_m: Option<f64>,
        sac_scale: Option<&str>,
    ) -> Result<TrailStats, GeoError> {
        let elevation_gain_m = elevation_gain_m.unwrap_or(0.0);
        validate_elevation_gain(elevation_gain_m)?;
        let distance_km = self.distance_km();
        let duration_hours = estimate_duration_hours(distance_km, speed_kmh)?;

        let mut difficulty = policy.classify(distance_km, elevation_gain_m);
        if let Some(floor) = sac_scale.and_then(sac_scale_floor) {
            difficulty = difficulty.max(floor);
        }

        Ok(TrailStats {
            distance_km,
            duration_hours,
            elevation_gain_m,
            difficulty,
        })
    }

    pub fn export_gpx(&self, name: Option<&str>) -> Result<String, AppError> {
        encode_trail_as_gpx(name, &self.points)
    }
}
