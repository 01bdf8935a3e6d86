//! Geometry model: WGS84 points and the straight segments between them

use crate::{Result, SurfaceError};
use geo::{Distance, Geodesic, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// As a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Geodesic distance in meters between two points on the WGS84 ellipsoid
///
/// Uses Karney's algorithm, which stays accurate down to segments a few
/// meters long where spherical or planar approximations drift.
#[inline]
pub fn geodesic_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    Geodesic.distance(a.to_point(), b.to_point())
}

/// The straight piece of a track between two consecutive recorded points
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    start: GeoPoint,
    end: GeoPoint,
    midpoint: GeoPoint,
    length_m: f64,
}

impl Segment {
    /// Create a segment, computing its midpoint and geodesic length once
    ///
    /// The midpoint is the coordinate mean of both ends, which is what the
    /// network is probed with. Tracks crossing the antimeridian are not handled.
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        let midpoint = GeoPoint::new((start.lat + end.lat) / 2.0, (start.lon + end.lon) / 2.0);
        Self {
            start,
            end,
            midpoint,
            length_m: geodesic_distance(start, end),
        }
    }

    #[inline]
    pub fn start(&self) -> GeoPoint {
        self.start
    }

    #[inline]
    pub fn end(&self) -> GeoPoint {
        self.end
    }

    #[inline]
    pub fn midpoint(&self) -> GeoPoint {
        self.midpoint
    }

    /// Geodesic length in meters, never negative
    #[inline]
    pub fn length_m(&self) -> f64 {
        self.length_m
    }
}

/// Turn an ordered point sequence into its N−1 consecutive segments
///
/// # Errors
/// [`SurfaceError::InsufficientData`] when fewer than two points are given.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_segments(points: &[GeoPoint]) -> Result<Vec<Segment>> {
    if points.len() < 2 {
        return Err(SurfaceError::InsufficientData {
            points: points.len(),
        });
    }

    Ok(points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Roughly 100 m north of (36.5, -4.88) at that latitude
    const LAT_STEP_100M: f64 = 0.000_901_16;

    #[test]
    fn test_geodesic_distance_known_value() {
        // One degree of latitude at the equator on WGS84
        let d = geodesic_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 110_574.389).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_geodesic_distance_short_and_symmetric() {
        let a = GeoPoint::new(36.5, -4.88);
        let b = GeoPoint::new(36.5 + LAT_STEP_100M, -4.88);
        let ab = geodesic_distance(a, b);
        let ba = geodesic_distance(b, a);
        assert!((ab - 100.0).abs() < 0.1, "got {ab}");
        assert!((ab - ba).abs() < 1e-9);
        assert!(geodesic_distance(a, a).abs() < 1e-9);
    }

    #[test]
    fn test_segment_midpoint_and_length() {
        let segment = Segment::new(GeoPoint::new(10.0, 20.0), GeoPoint::new(10.002, 20.004));
        assert_eq!(segment.start(), GeoPoint::new(10.0, 20.0));
        assert_eq!(segment.end(), GeoPoint::new(10.002, 20.004));
        assert!((segment.midpoint().lat - 10.001).abs() < 1e-12);
        assert!((segment.midpoint().lon - 20.002).abs() < 1e-12);
        assert!(segment.length_m() > 0.0);
    }

    #[test]
    fn test_build_segments_count_and_order() {
        let points: Vec<GeoPoint> = (0..5)
            .map(|i| GeoPoint::new(36.5 + i as f64 * 0.001, -4.88))
            .collect();

        let segments = build_segments(&points).unwrap();
        assert_eq!(segments.len(), points.len() - 1);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.start(), points[i]);
            assert_eq!(segment.end(), points[i + 1]);
            assert!(segment.length_m() >= 0.0);
        }
    }

    #[test]
    fn test_build_segments_repeated_point_has_zero_length() {
        let p = GeoPoint::new(36.5, -4.88);
        let segments = build_segments(&[p, p]).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].length_m().abs() < 1e-9);
    }

    #[test]
    fn test_build_segments_insufficient_data() {
        assert!(matches!(
            build_segments(&[]),
            Err(SurfaceError::InsufficientData { points: 0 })
        ));
        assert!(matches!(
            build_segments(&[GeoPoint::new(1.0, 2.0)]),
            Err(SurfaceError::InsufficientData { points: 1 })
        ));
    }

    #[test]
    fn test_point_conversion() {
        let p = GeoPoint::new(51.5, -0.12);
        let geo_point = p.to_point();
        assert_eq!(geo_point.x(), -0.12);
        assert_eq!(geo_point.y(), 51.5);
        assert_eq!(GeoPoint::from(geo_point), p);
    }
}
