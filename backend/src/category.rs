use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    pub icon: String,
}

/// Maps raw OSM tag values onto the place taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    /// Tag keys checked in order; the first present one supplies the raw category.
    pub tag_keys: Vec<String>,
    pub entries: BTreeMap<String, CategoryInfo>,
}

impl CategoryMap {
    pub fn raw_category<'a>(&self, tags: &'a BTreeMap<String, String>) -> &'a str {
        self.tag_keys
            .iter()
            .find_map(|key| tags.get(key))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn is_known(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn resolve(&self, raw: &str) -> CategoryInfo {
        self.entries.get(raw).cloned().unwrap_or_else(|| CategoryInfo {
            kind: "other".to_string(),
            subtype: raw.to_string(),
            icon: "📍".to_string(),
        })
    }

    /// 0.4 for a name, 0.2 each for a description, an external link and a
    /// mapped category.
    pub fn quality_score(&self, tags: &BTreeMap<String, String>, raw: &str) -> f64 {
        let present = |key: &str| tags.get(key).is_some_and(|v| !v.trim().is_empty());
        let mut score = 0.0;
        if present("name") {
            score += 0.4;
        }
        if present("description") {
            score += 0.2;
        }
        if present("wikipedia") || present("website") {
            score += 0.2;
        }
        if self.is_known(raw) {
            score += 0.2;
        }
        f64::min(score, 1.0)
    }

    pub fn iceland() -> Self {
        let entries = [
            ("waterfall", "natural", "waterfall", "💧"),
            ("geyser", "natural", "geyser", "♨️"),
            ("hot_spring", "natural", "hot_spring", "🌊"),
            ("spring", "natural", "spring", "💦"),
            ("beach", "natural", "beach", "🏖️"),
            ("cliff", "natural", "cliff", "⛰️"),
            ("cave_entrance", "natural", "cave", "🕳️"),
            ("peak", "natural", "peak", "⛰️"),
            ("glacier", "natural", "glacier", "🧊"),
            ("rock", "natural", "rock", "🪨"),
            ("volcano", "natural", "volcano", "🌋"),
            ("viewpoint", "tourism", "viewpoint", "👁️"),
            ("attraction", "tourism", "attraction", "⭐"),
            ("museum", "tourism", "museum", "🏛️"),
            ("information", "tourism", "information", "ℹ️"),
            ("picnic_site", "tourism", "picnic_site", "🧺"),
            ("hotel", "lodging", "hotel", "🏨"),
            ("hostel", "lodging", "hostel", "🛏️"),
            ("guest_house", "lodging", "guest_house", "🏡"),
            ("camp_site", "outdoor", "campsite", "⛺"),
            ("church", "historic", "church", "⛪"),
            ("ruins", "historic", "ruins", "🏛️"),
            ("monument", "historic", "monument", "🗿"),
            ("memorial", "historic", "memorial", "🕊️"),
            ("archaeological_site", "historic", "archaeological", "🏺"),
            ("restaurant", "food", "restaurant", "🍽️"),
            ("cafe", "food", "cafe", "☕"),
            ("village", "place", "village", "🏘️"),
            ("town", "place", "town", "🏙️"),
            ("nature_reserve", "outdoor", "nature_reserve", "🌿"),
            ("swimming_pool", "outdoor", "swimming", "🏊"),
            ("parking", "infrastructure", "parking", "🅿️"),
            ("toilets", "infrastructure", "toilets", "🚻"),
            ("fuel", "infrastructure", "fuel", "⛽"),
        ]
        .into_iter()
        .map(|(raw, kind, subtype, icon)| {
            (
                raw.to_string(),
                CategoryInfo {
                    kind: kind.to_string(),
                    subtype: subtype.to_string(),
                    icon: icon.to_string(),
                },
            )
        })
        .collect();

        Self {
            tag_keys: ["natural", "tourism", "historic", "amenity", "leisure", "place"]
                .into_iter()
                .map(String::from)
                .collect(),
            entries,
        }
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::iceland()
    }
}
