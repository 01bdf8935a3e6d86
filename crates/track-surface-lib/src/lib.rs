//! Track Surface Library - Paved/Unpaved Classification of GPS Tracks
//!
//! This library splits a recorded track into straight segments, matches the midpoint of each
//! segment to the nearest edge of a tagged road network, classifies the segment from the edge
//! tags and aggregates distance-weighted statistics.
//!
//! # Architecture
//!
//! - **[`GeoPoint`] / [`Segment`]**: Immutable WGS84 geometry with geodesic lengths
//! - **[`SpatialIndex`]**: Nearest-edge queries, implemented by the R-tree backed [`RoadNetwork`]
//! - **[`classify`]**: Tiered tag policy mapping an optional matched edge to a [`Classification`]
//! - **[`AggregateStats`]**: Per-class totals and percentages
//! - **[`SurfaceAnalyzer`]**: Runs the whole pipeline with a [`Config`]
//!
//! # Pipeline
//!
//! N points → N−1 segments → N−1 matches → N−1 classifications → 1 aggregate. Matching and
//! classification are a pure map over the segments (parallel when enabled, order preserved),
//! aggregation is a left-to-right fold.

mod analysis;
mod classify;
mod geometry;
mod matcher;
mod network;
mod stats;
pub mod track;
pub mod utils;

// Public API exports
pub use analysis::{ClassificationResult, Config, SurfaceAnalyzer, SurfaceReport};
pub use classify::{
    Classification, PAVED_HIGHWAYS, PAVED_SURFACES, TRACK_LIKE_HIGHWAYS, UNPAVED_SURFACES,
    UTILITY_HIGHWAYS, classify,
};
pub use geometry::{GeoPoint, Segment, build_segments, geodesic_distance};
pub use matcher::match_segments;
pub use network::{EdgeAttributes, EdgeTags, NetworkEdge, RoadNetwork, SpatialIndex, TagValue};
pub use stats::{AggregateStats, Totals};

/// Default matching radius in meters
pub const DEFAULT_MATCH_RADIUS_M: f64 = 50.0;

/// Error types for the surface analysis
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Insufficient data: at least 2 points are required, got {points}")]
    InsufficientData { points: usize },

    #[error("Total distance is zero, percentages are undefined")]
    ZeroTotalDistance,

    #[error("Invalid match radius: {0}")]
    InvalidRadius(f64),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Network parsing error: {0}")]
    NetworkParse(#[from] serde_json::Error),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn(Config) -> SurfaceAnalyzer = SurfaceAnalyzer::new;
        let _: fn() -> Config = Config::default;
        let _: fn(Vec<NetworkEdge>) -> RoadNetwork = RoadNetwork::new;
    }

    #[test]
    fn test_error_messages() {
        let err = SurfaceError::InsufficientData { points: 1 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: at least 2 points are required, got 1"
        );
        assert!(
            SurfaceError::ZeroTotalDistance
                .to_string()
                .contains("zero")
        );
    }
}
