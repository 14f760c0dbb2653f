//! Overpass API response shapes (`out body` / `out geom`).

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use shared::GeoPoint;

use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

impl OverpassResponse {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverpassPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<OverpassPoint> for GeoPoint {
    fn from(p: OverpassPoint) -> Self {
        GeoPoint::new(p.lat, p.lon)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassMember {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
    /// Missing nodes show up as `null` entries.
    #[serde(default)]
    pub geometry: Vec<Option<OverpassPoint>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<OverpassPoint>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub geometry: Vec<Option<OverpassPoint>>,
    #[serde(default)]
    pub members: Vec<OverpassMember>,
}

impl OverpassElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    /// Node position, or the `center` Overpass adds for ways and relations.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => self.center.map(GeoPoint::from),
        }
    }

    /// Path geometry: the element's own geometry, or for relations the way
    /// members' geometries concatenated in member order.
    pub fn path(&self) -> Vec<GeoPoint> {
        if !self.geometry.is_empty() {
            return self.geometry.iter().flatten().copied().map(GeoPoint::from).collect();
        }
        self.members
            .iter()
            .filter(|m| m.kind == ElementKind::Way)
            .flat_map(|m| m.geometry.iter().flatten().copied().map(GeoPoint::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 1, "lat": 64.3271, "lon": -20.1211,
             "tags": {"name": "Gullfoss", "natural": "waterfall"}},
            {"type": "way", "id": 2, "tags": {"name": "Esjan", "highway": "path"},
             "geometry": [{"lat": 64.2669, "lon": -21.6208}, null, {"lat": 64.2750, "lon": -21.6150}]},
            {"type": "relation", "id": 3, "tags": {"route": "hiking", "name": ""},
             "members": [
                {"type": "node", "ref": 9, "role": "", "geometry": []},
                {"type": "way", "ref": 10, "role": "", "geometry": [{"lat": 63.99, "lon": -19.06}]},
                {"type": "way", "ref": 11, "role": "", "geometry": [{"lat": 64.01, "lon": -19.03}]}
             ]}
        ]
    }"#;

    #[test]
    fn parses_mixed_elements() {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.elements.len(), 3);

        let node = &response.elements[0];
        assert_eq!(node.kind, ElementKind::Node);
        assert_eq!(node.position(), Some(GeoPoint::new(64.3271, -20.1211)));
        assert_eq!(node.name(), Some("Gullfoss"));
    }

    #[test]
    fn way_geometry_skips_missing_nodes() {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.elements[1].path().len(), 2);
        assert_eq!(response.elements[1].position(), None);
    }

    #[test]
    fn relation_path_joins_way_members() {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        let relation = &response.elements[2];
        assert_eq!(
            relation.path(),
            vec![GeoPoint::new(63.99, -19.06), GeoPoint::new(64.01, -19.03)]
        );
        assert_eq!(relation.name(), None);
    }
}
