//! Geographic position and great-circle proximity checks.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, as used by the standard haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine great-circle distance in meters.
///
/// Symmetric, zero for identical points, and numerically stable near the
/// poles and the antimeridian.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether `a` is within `radius_m` meters of `b`.
pub fn is_within_radius(a: GeoPoint, b: GeoPoint, radius_m: f64) -> bool {
    distance_meters(a, b) <= radius_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_identical_points_is_zero() {
        let p = GeoPoint::new(1.2815, 103.8440);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(1.2815, 103.8440);
        let b = GeoPoint::new(1.2900, 103.8500);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn test_nearby_marker_is_within_unlock_radius() {
        // ~1.3m apart in central Singapore
        let user = GeoPoint::new(1.2815, 103.8440);
        let marker = GeoPoint::new(1.28151, 103.84401);
        let d = distance_meters(user, marker);
        assert!(d < 2.0, "expected ~1.3m, got {d}");
        assert!(is_within_radius(user, marker, 20.0));
    }

    #[test]
    fn test_distant_marker_is_out_of_range() {
        // ~1.2km apart
        let user = GeoPoint::new(1.2815, 103.8440);
        let marker = GeoPoint::new(1.2900, 103.8500);
        let d = distance_meters(user, marker);
        assert!(d > 1_000.0 && d < 1_500.0, "expected ~1.2km, got {d}");
        assert!(!is_within_radius(user, marker, 20.0));
    }

    #[test]
    fn test_antimeridian_crossing_is_short() {
        // Two points 0.02 degrees of longitude apart across the date line
        let a = GeoPoint::new(0.0, 179.99);
        let b = GeoPoint::new(0.0, -179.99);
        let d = distance_meters(a, b);
        assert!(d < 3_000.0, "expected a short hop, got {d}");
    }

    #[test]
    fn test_near_pole_is_finite() {
        let a = GeoPoint::new(89.9999, 0.0);
        let b = GeoPoint::new(89.9999, 180.0);
        let d = distance_meters(a, b);
        assert!(d.is_finite());
        assert!(d < 100.0, "points near the pole are close, got {d}");
    }
}
