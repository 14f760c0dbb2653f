//! GPX rendering of a trail: one hiking track plus start and end waypoints.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use shared::GeoPoint;

use crate::error::AppError;

const CREATOR: &str = "trailgeo";
const TRACK_TYPE: &str = "hiking";

/// Build the GPX 1.1 document for a trail. An empty point list yields a
/// track with an empty segment and no waypoints.
pub fn trail_gpx(name: Option<&str>, points: &[GeoPoint]) -> Gpx {
    let name = name.unwrap_or(CREATOR);
    let segment = TrackSegment {
        points: points.iter().map(|p| waypoint(*p, None)).collect(),
    };
    let track = Track {
        name: Some(name.to_string()),
        type_: Some(TRACK_TYPE.to_string()),
        segments: vec![segment],
        ..Default::default()
    };

    let endpoints = match (points.first(), points.last()) {
        (Some(start), Some(end)) => vec![
            waypoint(*start, Some(format!("{name} (start)"))),
            waypoint(*end, Some(format!("{name} (end)"))),
        ],
        _ => Vec::new(),
    };

    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        waypoints: endpoints,
        tracks: vec![track],
        ..Default::default()
    }
}

/// [`trail_gpx`] serialized to XML and base64 encoded for JSON transport.
pub fn encode_trail_as_gpx(name: Option<&str>, points: &[GeoPoint]) -> Result<String, AppError> {
    let mut xml = Vec::new();
    gpx::write(&trail_gpx(name, points), &mut xml)?;
    Ok(BASE64.encode(xml))
}

fn waypoint(point: GeoPoint, name: Option<String>) -> Waypoint {
    let mut waypoint = Waypoint::new(Point::new(point.lon, point.lat));
    waypoint.name = name;
    waypoint
}
