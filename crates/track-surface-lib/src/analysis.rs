//! SurfaceAnalyzer - Top-level pipeline from track points to surface statistics
//!
//! This module wires the pieces together: segments are built once, matched
//! against a [`SpatialIndex`], classified independently and finally folded into
//! [`AggregateStats`].

use crate::classify::{Classification, classify};
use crate::geometry::{GeoPoint, Segment, build_segments};
use crate::matcher::match_segments;
use crate::network::{EdgeAttributes, SpatialIndex};
use crate::stats::{AggregateStats, Totals};
use crate::{DEFAULT_MATCH_RADIUS_M, Result, SurfaceError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the surface analysis
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum distance in meters between a segment midpoint and the matched
    /// edge (inclusive). Default: 50 m
    pub match_radius_m: f64,
    /// Match segments on the rayon thread pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_radius_m: DEFAULT_MATCH_RADIUS_M,
            parallel: true,
        }
    }
}

impl Config {
    /// Reject radii that make the nearest-edge query meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.match_radius_m.is_finite() || self.match_radius_m < 0.0 {
            return Err(SurfaceError::InvalidRadius(self.match_radius_m));
        }
        Ok(())
    }
}

/// Outcome for one segment of the track
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassificationResult {
    pub classification: Classification,
    pub segment: Segment,
    /// The matched edge, if any lay within the radius
    pub edge: Option<EdgeAttributes>,
}

/// Per-segment results in track order plus the aggregate over them
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceReport {
    pub results: Vec<ClassificationResult>,
    pub stats: AggregateStats,
}

/// Runs the classification pipeline with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct SurfaceAnalyzer {
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SurfaceAnalyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify every segment of the track, in track order
    ///
    /// # Errors
    /// [`SurfaceError::InsufficientData`] for fewer than two points and
    /// [`SurfaceError::InvalidRadius`] for an unusable configuration.
    pub fn classify_track<I: SpatialIndex + ?Sized>(
        &self,
        points: &[GeoPoint],
        index: &I,
    ) -> Result<Vec<ClassificationResult>> {
        self.config.validate()?;
        let radius_m = self.config.match_radius_m;

        let segments = build_segments(points)?;
        tracing::debug!(
            "Built {} segments from {} points",
            segments.len(),
            points.len()
        );

        let matches = match_segments(&segments, index, radius_m, self.config.parallel);

        Ok(segments
            .into_iter()
            .zip(matches)
            .map(|(segment, edge)| ClassificationResult {
                classification: classify(edge.as_ref(), radius_m),
                segment,
                edge,
            })
            .collect())
    }

    /// Fold classified segments into per-class totals and percentages
    ///
    /// # Errors
    /// [`SurfaceError::ZeroTotalDistance`] when the segments have no length.
    pub fn aggregate(results: &[ClassificationResult]) -> Result<AggregateStats> {
        Totals::from_lengths(
            results
                .iter()
                .map(|result| (result.classification, result.segment.length_m())),
        )
        .finish()
    }

    /// Full pipeline: segments, matches, classifications and statistics
    pub fn analyze<I: SpatialIndex + ?Sized>(
        &self,
        points: &[GeoPoint],
        index: &I,
    ) -> Result<SurfaceReport> {
        let results = self.classify_track(points, index)?;
        let stats = Self::aggregate(&results)?;

        tracing::info!(
            "Analyzed {:.2} km: {:.1}% paved, {:.1}% unpaved, {:.1}% unknown",
            stats.total_m / 1000.0,
            stats.paved_pct,
            stats.unpaved_pct,
            stats.unknown_pct
        );

        Ok(SurfaceReport { results, stats })
    }
}
