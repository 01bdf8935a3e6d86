//! Reference road network
//!
//! Edges carry OSM-style tags (`highway`, `surface`, `tracktype`) and a WGS84
//! line geometry. [`SpatialIndex`] is the only thing the analysis needs from a
//! network; [`RoadNetwork`] implements it with an R-tree over the straight
//! pieces of every edge, projected to Web Mercator.

use crate::geometry::{GeoPoint, geodesic_distance};
use crate::{Result, utils};
use geo::{Coord, LineString, Point};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Inflation applied to the Mercator search radius so that the ellipsoid's
/// radius of curvature never pushes a matching edge out of the candidate set
const SEARCH_MARGIN: f64 = 1.05;

/// Shortest meridian degree on WGS84 (at the equator), rounded down
const MIN_METERS_PER_DEGREE_LAT: f64 = 110_000.0;

/// A tag value as delivered by the network provider
///
/// Simplified networks merge ways, so one edge may carry several candidate
/// values for the same key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TagValue {
    Single(String),
    Candidates(Vec<String>),
}

impl TagValue {
    /// The value the classifier sees: the single value, or the first candidate
    ///
    /// Taking the first candidate is a deterministic simplification; a later
    /// candidate may describe the matched stretch better. Empty values count
    /// as absent.
    pub fn normalized(&self) -> Option<&str> {
        let value = match self {
            TagValue::Single(value) => value.as_str(),
            TagValue::Candidates(values) => values.first()?.as_str(),
        };
        (!value.is_empty()).then_some(value)
    }

    /// Interpret a JSON property, returning `None` for anything that is not a
    /// string or a list of strings
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(TagValue::Single(s.clone())),
            Value::Array(items) if !items.is_empty() => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(TagValue::Candidates),
            _ => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Single(value.to_owned())
    }
}

/// Tags of a network edge that matter for surface classification
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeTags {
    pub highway: Option<TagValue>,
    pub surface: Option<TagValue>,
    pub tracktype: Option<TagValue>,
}

impl EdgeTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_highway(mut self, value: impl Into<TagValue>) -> Self {
        self.highway = Some(value.into());
        self
    }

    pub fn with_surface(mut self, value: impl Into<TagValue>) -> Self {
        self.surface = Some(value.into());
        self
    }

    pub fn with_tracktype(mut self, value: impl Into<TagValue>) -> Self {
        self.tracktype = Some(value.into());
        self
    }

    fn from_properties(properties: &serde_json::Map<String, Value>) -> Self {
        let tag = |key: &str| properties.get(key).and_then(TagValue::from_json);
        Self {
            highway: tag("highway"),
            surface: tag("surface"),
            tracktype: tag("tracktype"),
        }
    }
}

/// A piece of the reference network
#[derive(Clone, Debug)]
pub struct NetworkEdge {
    pub tags: EdgeTags,
    /// WGS84 geometry (x = longitude, y = latitude)
    pub geometry: LineString<f64>,
}

impl NetworkEdge {
    pub fn new(tags: EdgeTags, geometry: LineString<f64>) -> Self {
        Self { tags, geometry }
    }

    /// Build an edge from (lat, lon) vertices
    pub fn from_points(tags: EdgeTags, points: &[GeoPoint]) -> Self {
        let geometry = points
            .iter()
            .map(|p| Coord { x: p.lon, y: p.lat })
            .collect::<Vec<_>>()
            .into();
        Self { tags, geometry }
    }
}

/// Normalized tags of the matched edge plus the true distance to it
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeAttributes {
    pub highway: Option<String>,
    pub surface: Option<String>,
    pub tracktype: Option<String>,
    /// Geodesic distance in meters from the query point to the edge
    pub distance_m: f64,
}

impl EdgeAttributes {
    pub fn from_tags(tags: &EdgeTags, distance_m: f64) -> Self {
        let normalize = |tag: &Option<TagValue>| {
            tag.as_ref()
                .and_then(TagValue::normalized)
                .map(str::to_owned)
        };
        Self {
            highway: normalize(&tags.highway),
            surface: normalize(&tags.surface),
            tracktype: normalize(&tags.tracktype),
            distance_m,
        }
    }
}

/// Nearest-edge queries against a reference network
///
/// Implementations return the attributes of the edge closest to `point`, with
/// the geodesic distance to it, or `None` when that edge is farther than
/// `radius_m`. A distance equal to the radius is a match.
pub trait SpatialIndex: Sync {
    fn find_nearest(&self, point: GeoPoint, radius_m: f64) -> Option<EdgeAttributes>;
}

/// A straight piece of an edge in Web Mercator meters
#[derive(Clone, Debug)]
struct EdgePiece {
    edge: usize,
    a: Point<f64>,
    b: Point<f64>,
}

impl RTreeObject for EdgePiece {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.a.x(), self.a.y()], [self.b.x(), self.b.y()])
    }
}

impl PointDistance for EdgePiece {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let p = Point::new(point[0], point[1]);
        let closest = utils::closest_point_on_line(p, self.a, self.b);
        let dx = closest.x() - p.x();
        let dy = closest.y() - p.y();
        dx * dx + dy * dy
    }
}

/// R-tree backed reference network
pub struct RoadNetwork {
    edges: Vec<NetworkEdge>,
    tree: RTree<EdgePiece>,
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RoadNetwork {
    /// Index the given edges
    ///
    /// Edges with coordinates outside WGS84 ranges are kept for lookup by id
    /// but never indexed.
    pub fn new(edges: Vec<NetworkEdge>) -> Self {
        let mut pieces = Vec::new();
        for (edge_index, edge) in edges.iter().enumerate() {
            if !edge.geometry.coords().all(|c| utils::is_valid_wgs84(c.y, c.x)) {
                tracing::warn!("Skipping network edge {edge_index} with invalid coordinates");
                continue;
            }
            pieces.extend(edge.geometry.lines().map(|line| EdgePiece {
                edge: edge_index,
                a: utils::wgs84_to_mercator(line.start.y, line.start.x),
                b: utils::wgs84_to_mercator(line.end.y, line.end.x),
            }));
        }

        tracing::debug!(
            "Indexed {} network edges as {} pieces",
            edges.len(),
            pieces.len()
        );

        Self {
            edges,
            tree: RTree::bulk_load(pieces),
        }
    }

    /// Parse a GeoJSON FeatureCollection of `LineString` / `MultiLineString`
    /// features whose properties hold the edge tags
    pub fn from_geojson_reader<R: Read>(reader: R) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        Ok(Self::new(collection.into_edges()))
    }

    pub fn from_geojson_str(json: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        Ok(Self::new(collection.into_edges()))
    }

    /// Load a GeoJSON network file
    pub fn load_geojson<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_geojson_reader(std::io::BufReader::new(file))
    }

    /// All edges, indexed by their id
    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl SpatialIndex for RoadNetwork {
    fn find_nearest(&self, point: GeoPoint, radius_m: f64) -> Option<EdgeAttributes> {
        let query = utils::wgs84_to_mercator(point.lat, point.lon);
        // The scale grows poleward, so take it at the far edge of the band
        let poleward_lat = point.lat.abs() + radius_m / MIN_METERS_PER_DEGREE_LAT;
        let search_radius = radius_m * utils::mercator_scale_factor(poleward_lat) * SEARCH_MARGIN;

        // Candidates come from the plane, the winner from the ellipsoid
        let mut best: Option<(usize, f64)> = None;
        for piece in self
            .tree
            .locate_within_distance([query.x(), query.y()], search_radius * search_radius)
        {
            let closest = utils::closest_point_on_line(query, piece.a, piece.b);
            let (lat, lon) = utils::mercator_to_wgs84(closest.x(), closest.y());
            let distance = geodesic_distance(point, GeoPoint::new(lat, lon));

            let better = match best {
                None => true,
                Some((edge, best_distance)) => {
                    distance < best_distance || (distance == best_distance && piece.edge < edge)
                }
            };
            if better {
                best = Some((piece.edge, distance));
            }
        }

        let (edge, distance) = best.filter(|&(_, distance)| distance <= radius_m)?;
        Some(EdgeAttributes::from_tags(&self.edges[edge].tags, distance))
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

impl FeatureCollection {
    fn into_edges(self) -> Vec<NetworkEdge> {
        let mut edges = Vec::with_capacity(self.features.len());
        let mut skipped = 0usize;

        for feature in self.features {
            let tags = feature
                .properties
                .as_ref()
                .map(EdgeTags::from_properties)
                .unwrap_or_default();

            let lines = match feature.geometry {
                Some(Geometry::LineString { coordinates }) => vec![coordinates],
                Some(Geometry::MultiLineString { coordinates }) => coordinates,
                Some(Geometry::Unsupported) | None => {
                    skipped += 1;
                    continue;
                }
            };

            for positions in lines {
                match line_from_positions(&positions) {
                    Some(geometry) => edges.push(NetworkEdge::new(tags.clone(), geometry)),
                    None => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {skipped} network features without usable line geometry");
        }
        edges
    }
}

/// GeoJSON positions are `[lon, lat, ...]`; anything shorter is unusable
fn line_from_positions(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    let coords = positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Some(Coord { x: *lon, y: *lat }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (coords.len() >= 2).then(|| LineString::from(coords))
}
