//! Nearest-edge matching of segment midpoints

use crate::geometry::Segment;
use crate::network::{EdgeAttributes, SpatialIndex};
use rayon::prelude::*;

/// Match every segment's midpoint against the network
///
/// The result has one entry per segment, in segment order. `None` means no
/// edge lies within `radius_m`; a distance equal to the radius still matches.
/// Matches an index reports beyond the radius are discarded here as well.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn match_segments<I: SpatialIndex + ?Sized>(
    segments: &[Segment],
    index: &I,
    radius_m: f64,
    parallel: bool,
) -> Vec<Option<EdgeAttributes>> {
    let lookup = |segment: &Segment| {
        index
            .find_nearest(segment.midpoint(), radius_m)
            .filter(|edge| edge.distance_m <= radius_m)
    };

    // Indexed parallel iterators collect in input order
    let matches: Vec<Option<EdgeAttributes>> = if parallel {
        segments.par_iter().map(lookup).collect()
    } else {
        segments.iter().map(lookup).collect()
    };

    tracing::debug!(
        "Matched {}/{} segment midpoints within {radius_m} m",
        matches.iter().filter(|m| m.is_some()).count(),
        segments.len()
    );

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeoPoint, build_segments};

    /// Index that echoes the query latitude, so every answer can be traced
    /// back to the segment that asked for it
    struct LatitudeDistanceIndex;

    impl SpatialIndex for LatitudeDistanceIndex {
        fn find_nearest(&self, point: GeoPoint, _radius_m: f64) -> Option<EdgeAttributes> {
            Some(EdgeAttributes {
                highway: Some(format!("{:.4}", point.lat)),
                surface: None,
                tracktype: None,
                distance_m: point.lat.fract() * 100.0,
            })
        }
    }

    /// Index whose nearest edge is always exactly `distance_m` away
    struct FixedDistanceIndex {
        distance_m: f64,
    }

    impl SpatialIndex for FixedDistanceIndex {
        fn find_nearest(&self, _point: GeoPoint, _radius_m: f64) -> Option<EdgeAttributes> {
            Some(EdgeAttributes {
                highway: Some("primary".to_string()),
                surface: None,
                tracktype: None,
                distance_m: self.distance_m,
            })
        }
    }

    fn test_segments(n: usize) -> Vec<Segment> {
        let points: Vec<GeoPoint> = (0..=n)
            .map(|i| GeoPoint::new(10.0 + i as f64 * 0.01, 20.0))
            .collect();
        build_segments(&points).unwrap()
    }

    #[test]
    fn test_order_is_preserved() {
        let segments = test_segments(200);
        for parallel in [false, true] {
            let matches = match_segments(&segments, &LatitudeDistanceIndex, 1000.0, parallel);
            assert_eq!(matches.len(), segments.len());
            for (segment, found) in segments.iter().zip(&matches) {
                let expected = format!("{:.4}", segment.midpoint().lat);
                assert_eq!(
                    found.as_ref().unwrap().highway.as_deref(),
                    Some(expected.as_str())
                );
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let segments = test_segments(64);
        let sequential = match_segments(&segments, &LatitudeDistanceIndex, 60.0, false);
        let parallel = match_segments(&segments, &LatitudeDistanceIndex, 60.0, true);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let segments = test_segments(3);

        let at_radius = match_segments(
            &segments,
            &FixedDistanceIndex { distance_m: 50.0 },
            50.0,
            false,
        );
        assert!(at_radius.iter().all(Option::is_some));

        let beyond = match_segments(
            &segments,
            &FixedDistanceIndex { distance_m: 50.000_001 },
            50.0,
            false,
        );
        assert!(beyond.iter().all(Option::is_none));
    }
}
