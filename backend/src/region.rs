use serde::{Deserialize, Serialize};
use shared::{BoundingBox, GeoPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bounds: BoundingBox,
}

/// Ordered region boxes; the first box containing a point names its region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    pub regions: Vec<Region>,
    pub fallback: String,
}

impl RegionTable {
    pub fn detect(&self, point: GeoPoint) -> &str {
        self.regions
            .iter()
            .find(|region| region.bounds.contains(point))
            .map(|region| region.name.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Names of regions whose box is inverted.
    pub fn inverted_regions(&self) -> Vec<&str> {
        self.regions
            .iter()
            .filter(|r| !r.bounds.is_ordered())
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn iceland() -> Self {
        let region = |name: &str, lat: (f64, f64), lon: (f64, f64)| Region {
            name: name.to_string(),
            bounds: BoundingBox {
                min_lat: lat.0,
                max_lat: lat.1,
                min_lon: lon.0,
                max_lon: lon.1,
            },
        };

        Self {
            regions: vec![
                region("Höfuðborgarsvæðið", (64.0, 64.2), (-22.2, -21.6)),
                region("Suðurland", (63.4, 64.0), (-21.0, -19.0)),
                region("Suðurnes", (63.8, 64.1), (-22.8, -22.0)),
                region("Vesturland", (64.5, 65.2), (-23.0, -20.5)),
                region("Vestfirðir", (65.4, 66.5), (-24.5, -20.5)),
                region("Norðurland vestra", (65.0, 66.0), (-20.5, -18.0)),
                region("Norðurland eystra", (65.3, 66.5), (-18.0, -15.5)),
                region("Austurland", (64.0, 66.0), (-16.5, -13.5)),
                region("Hálendi", (64.2, 65.2), (-20.0, -16.0)),
            ],
            fallback: "Óþekkt".to_string(),
        }
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::iceland()
    }
}
