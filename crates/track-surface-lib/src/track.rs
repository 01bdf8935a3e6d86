//! Track source: ordered points from GPX recordings
//!
//! Points of every segment of every track are concatenated in document order.
//! The analysis treats the result as a single path.

use crate::geometry::GeoPoint;
use crate::{Result, utils};
use geo::{Destination, Geodesic, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Extract the ordered track points of a GPX document
///
/// Points outside WGS84 ranges are skipped with a warning.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn points_from_gpx(gpx: &gpx::Gpx) -> Vec<GeoPoint> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let point = waypoint.point();
                if utils::is_valid_wgs84(point.y(), point.x()) {
                    points.push(GeoPoint::new(point.y(), point.x()));
                } else {
                    skipped += 1;
                }
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {skipped} track points outside WGS84 bounds");
    }
    tracing::debug!(
        "Extracted {} points from {} tracks",
        points.len(),
        gpx.tracks.len()
    );
    points
}

/// Parse GPX from any reader and extract its points
pub fn read_gpx<R: Read>(reader: R) -> Result<Vec<GeoPoint>> {
    let gpx = gpx::read(reader)?;
    Ok(points_from_gpx(&gpx))
}

/// Load a GPX file and extract its points
pub fn load_gpx<P: AsRef<Path>>(path: P) -> Result<Vec<GeoPoint>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_gpx(std::io::BufReader::new(file))
}

/// Padding around the track when requesting a network extract
pub const NETWORK_BUFFER_M: f64 = 150.0;

/// WGS84 bounding box in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// `south,west,north,east`, the order Overpass bbox filters expect
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

/// Bounding box of the track grown by `buffer_m` meters on every side
///
/// This is the region a network provider has to cover so that every segment
/// midpoint can find edges within a radius of up to `buffer_m`.
/// Returns `None` for an empty track.
pub fn bounding_box(points: &[GeoPoint], buffer_m: f64) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bbox = BoundingBox {
        min_lat: first.lat,
        min_lon: first.lon,
        max_lat: first.lat,
        max_lon: first.lon,
    };
    for p in &points[1..] {
        bbox.min_lat = bbox.min_lat.min(p.lat);
        bbox.min_lon = bbox.min_lon.min(p.lon);
        bbox.max_lat = bbox.max_lat.max(p.lat);
        bbox.max_lon = bbox.max_lon.max(p.lon);
    }

    if buffer_m <= 0.0 {
        return Some(bbox);
    }

    let north = Geodesic.destination(Point::new(bbox.max_lon, bbox.max_lat), 0.0, buffer_m);
    let south = Geodesic.destination(Point::new(bbox.min_lon, bbox.min_lat), 180.0, buffer_m);
    // Longitude degrees are shortest at the latitude farthest from the equator
    let widest_lat = if bbox.max_lat.abs() > bbox.min_lat.abs() {
        bbox.max_lat
    } else {
        bbox.min_lat
    };
    let east = Geodesic.destination(Point::new(bbox.max_lon, widest_lat), 90.0, buffer_m);
    let lon_pad = east.x() - bbox.max_lon;

    Some(BoundingBox {
        min_lat: south.y().max(-90.0),
        min_lon: (bbox.min_lon - lon_pad).max(-180.0),
        max_lat: north.y().min(90.0),
        max_lon: (bbox.max_lon + lon_pad).min(180.0),
    })
}
