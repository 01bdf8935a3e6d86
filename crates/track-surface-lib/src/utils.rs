//! Coordinate projections used by the spatial index
//!
//! Network edges are indexed in Web Mercator so that the R-tree works in a
//! roughly metric, conformal plane. Distances measured in this plane are
//! inflated by `1 / cos(lat)`, so they are only used to select candidates;
//! reported distances always come from the geodesic in [`crate::geometry`].

use geo::Point;

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// # Arguments
/// * `lat` - Latitude in degrees, clamped to the Web Mercator range
/// * `lon` - Longitude in degrees (-180 to 180)
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84, returned as (lat, lon) in degrees
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// Ratio between a length in the Mercator plane and the same length on the
/// ground, at the given latitude
#[inline]
pub fn mercator_scale_factor(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    1.0 / lat.to_radians().cos()
}

/// Check that a (lat, lon) pair is a usable WGS84 coordinate
#[inline]
pub fn is_valid_wgs84(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Closest point to `p` on the straight segment `a`-`b`, in planar coordinates
pub fn closest_point_on_line(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> Point<f64> {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = (((p.x() - a.x()) * dx + (p.y() - a.y()) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x() + t * dx, a.y() + t * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_to_mercator_origin() {
        let point = wgs84_to_mercator(0.0, 0.0);
        assert!((point.x() - 0.0).abs() < 0.01);
        assert!((point.y() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_mercator_to_wgs84_roundtrip() {
        let lat = 36.5101;
        let lon = -4.8825;

        let mercator = wgs84_to_mercator(lat, lon);
        let (lat2, lon2) = mercator_to_wgs84(mercator.x(), mercator.y());

        assert!((lat - lat2).abs() < 1e-9);
        assert!((lon - lon2).abs() < 1e-9);
    }

    #[test]
    fn test_scale_factor() {
        assert!((mercator_scale_factor(0.0) - 1.0).abs() < 1e-12);
        assert!((mercator_scale_factor(60.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_valid_wgs84() {
        assert!(is_valid_wgs84(51.5, -0.12));
        assert!(is_valid_wgs84(-90.0, 180.0));
        assert!(!is_valid_wgs84(91.0, 0.0));
        assert!(!is_valid_wgs84(0.0, -180.5));
        assert!(!is_valid_wgs84(f64::NAN, 0.0));
    }

    #[test]
    fn test_closest_point_on_line() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        let inside = closest_point_on_line(Point::new(4.0, 3.0), a, b);
        assert!((inside.x() - 4.0).abs() < 1e-12);
        assert!(inside.y().abs() < 1e-12);

        let before = closest_point_on_line(Point::new(-5.0, 1.0), a, b);
        assert_eq!(before, a);

        let after = closest_point_on_line(Point::new(15.0, -1.0), a, b);
        assert_eq!(after, b);

        let degenerate = closest_point_on_line(Point::new(3.0, 3.0), a, a);
        assert_eq!(degenerate, a);
    }
}
