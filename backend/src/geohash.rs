//! Geohash encoding by alternating longitude/latitude bisection.
//!
//! Precision 5 is a cell of roughly 5 km, 6 about 1.2 km, 7 about 150 m,
//! 8 about 38 m and 9 about 5 m.

use shared::{BoundingBox, GeoPoint, GeohashLevels};

use crate::error::GeoError;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const BITS_PER_CHAR: u32 = 5;

pub const MAX_PRECISION: usize = 12;
pub const DEFAULT_PRECISION: usize = 9;

/// Encode `(lat, lon)` as a geohash of `precision` characters.
///
/// Out-of-range or non-finite coordinates are rejected with
/// [`GeoError::InvalidCoordinate`] rather than clamped.
pub fn encode_geohash(lat: f64, lon: f64, precision: usize) -> Result<String, GeoError> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        });
    }
    if !GeoPoint::new(lat, lon).is_valid() {
        return Err(GeoError::InvalidCoordinate { lat, lon });
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0;
    let mut index = 0usize;

    while hash.len() < precision {
        let (range, value) = if even {
            (&mut lon_range, lon)
        } else {
            (&mut lat_range, lat)
        };
        let mid = (range.0 + range.1) / 2.0;
        index <<= 1;
        if value >= mid {
            index |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }

        even = !even;
        bits += 1;
        if bits == BITS_PER_CHAR {
            hash.push(char::from(BASE32[index]));
            bits = 0;
            index = 0;
        }
    }

    Ok(hash)
}

pub fn encode_point(point: GeoPoint, precision: usize) -> Result<String, GeoError> {
    encode_geohash(point.lat, point.lon, precision)
}

/// The five precisions stored on every place for radius queries.
pub fn geohash_levels(point: GeoPoint) -> Result<GeohashLevels, GeoError> {
    Ok(GeohashLevels {
        g5: encode_point(point, 5)?,
        g6: encode_point(point, 6)?,
        g7: encode_point(point, 7)?,
        g8: encode_point(point, 8)?,
        g9: encode_point(point, 9)?,
    })
}

/// Bounding box of the cell a geohash names. The empty hash is the whole globe.
pub fn cell_bounds(hash: &str) -> Result<BoundingBox, GeoError> {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut even = true;

    for (position, character) in hash.chars().enumerate() {
        let index = BASE32
            .iter()
            .position(|&c| char::from(c) == character)
            .ok_or(GeoError::InvalidGeohash {
                position,
                character,
            })?;

        for shift in (0..BITS_PER_CHAR).rev() {
            let range = if even { &mut lon_range } else { &mut lat_range };
            let mid = (range.0 + range.1) / 2.0;
            if (index >> shift) & 1 == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even = !even;
        }
    }

    Ok(BoundingBox {
        min_lat: lat_range.0,
        max_lat: lat_range.1,
        min_lon: lon_range.0,
        max_lon: lon_range.1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reykjavik_snapshot() {
        assert_eq!(encode_geohash(64.1466, -21.9426, 6).unwrap(), "ge2kut");
        assert_eq!(encode_geohash(64.1466, -21.9426, 9).unwrap(), "ge2kuttch");
    }

    #[test]
    fn matches_reference_value() {
        // Well-known reference hash for a point in Jutland.
        assert_eq!(encode_geohash(57.64911, 10.40744, 11).unwrap(), "u4pruydqqvj");
    }

    #[test]
    fn corners_and_origin() {
        assert_eq!(encode_geohash(0.0, 0.0, 5).unwrap(), "s0000");
        assert_eq!(encode_geohash(90.0, 180.0, 4).unwrap(), "zzzz");
        assert_eq!(encode_geohash(-90.0, -180.0, 4).unwrap(), "0000");
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            encode_geohash(91.0, 0.0, 5),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode_geohash(0.0, -180.5, 5),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode_geohash(f64::NAN, 0.0, 5),
            Err(GeoError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn rejects_bad_precision() {
        assert_eq!(
            encode_geohash(64.0, -21.0, 0),
            Err(GeoError::InvalidPrecision {
                precision: 0,
                max: MAX_PRECISION
            })
        );
        assert!(encode_geohash(64.0, -21.0, MAX_PRECISION + 1).is_err());
    }

    #[test]
    fn levels_share_prefixes() {
        let levels = geohash_levels(GeoPoint::new(63.5321, -19.5117)).unwrap();
        assert_eq!(levels.g9, "ge61kj8j2");
        assert!(levels.g9.starts_with(&levels.g8));
        assert!(levels.g8.starts_with(&levels.g7));
        assert!(levels.g7.starts_with(&levels.g6));
        assert!(levels.g6.starts_with(&levels.g5));
    }

    #[test]
    fn cell_bounds_rejects_unknown_characters() {
        assert_eq!(
            cell_bounds("ge2a"),
            Err(GeoError::InvalidGeohash {
                position: 3,
                character: 'a'
            })
        );
    }

    #[test]
    fn empty_hash_is_whole_globe() {
        let bounds = cell_bounds("").unwrap();
        assert_eq!(bounds.min_lat, -90.0);
        assert_eq!(bounds.max_lon, 180.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_point() -> impl Strategy<Value = (f64, f64)> {
            (-90.0..=90.0, -180.0..=180.0)
        }

        proptest! {
            #[test]
            fn prop_length_matches_precision((lat, lon) in valid_point(), precision in 1..=MAX_PRECISION) {
                let hash = encode_geohash(lat, lon, precision).unwrap();
                prop_assert_eq!(hash.len(), precision);
            }

            #[test]
            fn prop_prefix_of_finer_hash((lat, lon) in valid_point(), precision in 1..MAX_PRECISION) {
                let coarse = encode_geohash(lat, lon, precision).unwrap();
                let fine = encode_geohash(lat, lon, precision + 1).unwrap();
                prop_assert!(fine.starts_with(&coarse));
            }

            #[test]
            fn prop_point_inside_own_cell((lat, lon) in valid_point(), precision in 1..=MAX_PRECISION) {
                let hash = encode_geohash(lat, lon, precision).unwrap();
                let cell = cell_bounds(&hash).unwrap();
                prop_assert!(cell.contains(GeoPoint::new(lat, lon)));
            }

            #[test]
            fn prop_cell_center_reencodes_to_same_hash((lat, lon) in valid_point(), precision in 1..=MAX_PRECISION) {
                let hash = encode_geohash(lat, lon, precision).unwrap();
                let center = cell_bounds(&hash).unwrap().center();
                prop_assert_eq!(encode_point(center, precision).unwrap(), hash);
            }
        }
    }
}
