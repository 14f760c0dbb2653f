//! Turns Overpass elements into place and trail documents.

use std::collections::HashSet;

use crate::{
    config::AppConfig,
    error::GeoError,
    geohash::{encode_point, geohash_levels},
    models::{PlaceDocument, TrailDocument, TrailEndpoint},
    overpass::OverpassElement,
    polyline::flatten_polyline,
    trail::Trail,
};

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Build a place from a named element with a position; anything else is skipped.
pub fn place_from_element(
    element: &OverpassElement,
    config: &AppConfig,
) -> Result<Option<PlaceDocument>, GeoError> {
    let (Some(name), Some(position)) = (element.name(), element.position()) else {
        return Ok(None);
    };
    if !position.is_valid() {
        return Err(GeoError::InvalidCoordinate {
            lat: position.lat,
            lon: position.lon,
        });
    }

    let categories = &config.categories;
    let raw = categories.raw_category(&element.tags);

    Ok(Some(PlaceDocument {
        id: format!("osm_{}", element.id),
        name: name.to_string(),
        name_en: element.tag("name:en").map(String::from),
        category: raw.to_string(),
        taxonomy: categories.resolve(raw),
        lat: round_to(position.lat, 6),
        lng: round_to(position.lon, 6),
        region: config.regions.detect(position).to_string(),
        geohash: encode_point(position, config.geohash_precision)?,
        geohashes: geohash_levels(position)?,
        quality_score: round_to(categories.quality_score(&element.tags, raw), 2),
        description: element.tag("description").map(String::from),
        wikipedia: element.tag("wikipedia").map(String::from),
        website: element.tag("website").map(String::from),
        osm_id: element.id,
        osm_type: element.kind.as_str().to_string(),
        tags: element.tags.clone(),
    }))
}

/// Keep the first place per (~10 m cell, normalized name). Returns the kept
/// places and the number dropped.
pub fn dedupe_places(places: Vec<PlaceDocument>) -> (Vec<PlaceDocument>, usize) {
    let mut seen = HashSet::new();
    let before = places.len();
    let kept: Vec<PlaceDocument> = places
        .into_iter()
        .filter(|place| {
            seen.insert((
                (place.lat * 1e4).round() as i64,
                (place.lng * 1e4).round() as i64,
                place.name.trim().to_lowercase(),
            ))
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Build a trail from a named element with a non-degenerate path.
///
/// Elevation data is not part of Overpass responses, so the gain is recorded
/// as zero and difficulty follows distance and `sac_scale`.
pub fn trail_from_element(
    element: &OverpassElement,
    config: &AppConfig,
) -> Result<Option<TrailDocument>, GeoError> {
    let Some(name) = element.name() else {
        return Ok(None);
    };
    let path = element.path();
    if path.is_empty() {
        return Ok(None);
    }

    let trail = Trail::new(path)?;
    let sac_scale = element.tag("sac_scale");
    let stats = trail.summarize(&config.difficulty, config.speed_kmh, None, sac_scale)?;
    let distance_km = round_to(stats.distance_km, 2);
    if distance_km == 0.0 {
        return Ok(None);
    }

    let start = trail.start();
    let end = trail.end();
    Ok(Some(TrailDocument {
        id: format!("trail_{}", element.id),
        name: name.to_string(),
        osm_id: element.id,
        osm_type: element.kind.as_str().to_string(),
        distance_km,
        duration_hours: round_to(stats.duration_hours, 1),
        elevation_gain_m: stats.elevation_gain_m,
        difficulty: stats.difficulty,
        start: TrailEndpoint {
            lat: start.lat,
            lng: start.lon,
            name: element.tag("from").unwrap_or("Start").to_string(),
        },
        end: TrailEndpoint {
            lat: end.lat,
            lng: end.lon,
            name: element.tag("to").unwrap_or("End").to_string(),
        },
        polyline_encoded: trail.encoded_polyline()?,
        polyline: flatten_polyline(&config.sampling.apply(trail.points())),
        polyline_points: trail.len(),
        polyline_preview: trail.preview(),
        surface: element.tag("surface").unwrap_or("trail").to_string(),
        sac_scale: sac_scale.map(String::from),
        region: config.regions.detect(start).to_string(),
        geohash: encode_point(start, config.geohash_precision)?,
        description: element.tag("description").map(String::from),
        fetched_at: chrono::Utc::now().to_rfc3339(),
    }))
}
