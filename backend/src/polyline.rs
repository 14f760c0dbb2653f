//! Delta + base64-offset polyline codec at a fixed 1e-5 degree precision.

use serde::{Deserialize, Serialize};
use shared::GeoPoint;

use crate::error::GeoError;

const SCALE: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: u64 = 0x1f;
const CONTINUATION: u64 = 0x20;
const OFFSET: u8 = 63;
const MAX_CHAR: u8 = OFFSET + 0x3f;

/// Encode points in order, latitude chunk before longitude chunk.
///
/// Coordinates are quantized to 1e-5 degrees before the deltas are taken, so
/// decoding never drifts by more than half a unit no matter how long the trail.
pub fn encode_polyline(points: &[GeoPoint]) -> Result<String, GeoError> {
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;

    for point in points {
        if !point.is_valid() {
            return Err(GeoError::InvalidCoordinate {
                lat: point.lat,
                lon: point.lon,
            });
        }
        let lat = quantize(point.lat);
        let lon = quantize(point.lon);
        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lon - prev_lon, &mut encoded);
        prev_lat = lat;
        prev_lon = lon;
    }

    Ok(encoded)
}

/// Inverse of [`encode_polyline`]. Fails on characters outside `?`..`~`, on a
/// value cut off mid-chunk, on a latitude without its longitude, and on
/// running sums that leave the coordinate range.
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, GeoError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat = 0i64;
    let mut lon = 0i64;

    while index < bytes.len() {
        let start = index;
        lat = accumulate(lat, decode_value(bytes, &mut index)?, start)?;
        if index >= bytes.len() {
            return Err(GeoError::MalformedPolyline {
                position: index,
                reason: "latitude without longitude",
            });
        }
        lon = accumulate(lon, decode_value(bytes, &mut index)?, start)?;

        let point = GeoPoint {
            lat: lat as f64 / SCALE,
            lon: lon as f64 / SCALE,
        };
        if !point.is_valid() {
            return Err(GeoError::MalformedPolyline {
                position: start,
                reason: "coordinate out of range",
            });
        }
        points.push(point);
    }

    Ok(points)
}

fn accumulate(total: i64, delta: i64, position: usize) -> Result<i64, GeoError> {
    total.checked_add(delta).ok_or(GeoError::MalformedPolyline {
        position,
        reason: "coordinate overflows",
    })
}

fn quantize(value: f64) -> i64 {
    (value * SCALE).round() as i64
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 {
        !(delta << 1) as u64
    } else {
        (delta << 1) as u64
    };
    while value >= CONTINUATION {
        out.push(char::from(
            ((CONTINUATION | (value & CHUNK_MASK)) as u8) + OFFSET,
        ));
        value >>= CHUNK_BITS;
    }
    out.push(char::from(value as u8 + OFFSET));
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, GeoError> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(GeoError::MalformedPolyline {
                position: *index,
                reason: "truncated value",
            });
        };
        if !(OFFSET..=MAX_CHAR).contains(&byte) {
            return Err(GeoError::MalformedPolyline {
                position: *index,
                reason: "character outside polyline alphabet",
            });
        }
        if shift >= u64::BITS {
            return Err(GeoError::MalformedPolyline {
                position: *index,
                reason: "value overflows 64 bits",
            });
        }

        let chunk = u64::from(byte - OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        *index += 1;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };
    Ok(value)
}

/// `[lat, lon, lat, lon, ...]`, the layout stored when nested arrays are not allowed.
pub fn flatten_polyline(points: &[GeoPoint]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.lat, p.lon]).collect()
}

/// First, middle and last point for quick map display.
pub fn polyline_preview(points: &[GeoPoint]) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    vec![points[0], points[points.len() / 2], points[points.len() - 1]]
}

/// Thinning applied to stored trail geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampling {
    pub threshold: usize,
    pub step: usize,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            threshold: 100,
            step: 10,
        }
    }
}

impl Sampling {
    pub fn apply(&self, points: &[GeoPoint]) -> Vec<GeoPoint> {
        downsample(points, self.threshold, self.step)
    }
}

/// Keep every `step`-th point of trails longer than `threshold`, always
/// including the final point.
pub fn downsample(points: &[GeoPoint], threshold: usize, step: usize) -> Vec<GeoPoint> {
    if points.len() <= threshold || step <= 1 {
        return points.to_vec();
    }
    let mut sampled: Vec<GeoPoint> = points.iter().step_by(step).copied().collect();
    if (points.len() - 1) % step != 0 {
        if let Some(last) = points.last() {
            sampled.push(*last);
        }
    }
    sampled
}
