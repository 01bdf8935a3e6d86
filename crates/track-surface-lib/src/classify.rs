//! Tiered surface classification of a matched network edge
//!
//! The tiers are evaluated strictly in order and the first one that applies
//! decides:
//!
//! 1. No match, or the match is farther than the radius: unknown
//! 2. Surface tag in [`PAVED_SURFACES`]: paved
//! 3. Surface tag in [`UNPAVED_SURFACES`]: unpaved
//! 4. Surface tag absent or unrecognised and highway in [`PAVED_HIGHWAYS`]: paved
//! 5. Highway in [`TRACK_LIKE_HIGHWAYS`]: paved for `tracktype=grade1`, unpaved otherwise
//! 6. Highway in [`UTILITY_HIGHWAYS`]: paved for a paved surface, unknown otherwise
//! 7. Anything else: unknown

use crate::network::EdgeAttributes;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highway classes that are paved unless a surface tag says otherwise
pub const PAVED_HIGHWAYS: &[&str] = &[
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "living_street",
    "service",
    "unclassified",
];

pub const PAVED_SURFACES: &[&str] = &[
    "asphalt",
    "paved",
    "concrete",
    "concrete:lanes",
    "sett",
    "paving_stones",
    "cement",
    "concrete:plates",
    "metal",
    "wood",
];

pub const UNPAVED_SURFACES: &[&str] = &[
    "unpaved",
    "gravel",
    "fine_gravel",
    "ground",
    "dirt",
    "earth",
    "compacted",
    "sand",
    "grass",
    "mud",
    "pebblestone",
];

/// Highway classes graded by `tracktype`
pub const TRACK_LIKE_HIGHWAYS: &[&str] = &["track", "path", "bridleway"];

/// Highway classes whose surface cannot be inferred from the class alone
pub const UTILITY_HIGHWAYS: &[&str] = &["footway", "cycleway"];

/// The only `tracktype` grade treated as paved
const PAVED_TRACK_GRADE: &str = "grade1";

/// Surface class of a track segment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Classification {
    Paved,
    Unpaved,
    Unknown,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Paved,
        Classification::Unpaved,
        Classification::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Paved => "paved",
            Classification::Unpaved => "unpaved",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
fn is_in(value: Option<&str>, set: &[&str]) -> bool {
    value.is_some_and(|v| set.contains(&v))
}

/// Classify a segment from the edge it was matched to
///
/// Pure and total: absent tags simply fall through to the next tier.
pub fn classify(edge: Option<&EdgeAttributes>, radius_m: f64) -> Classification {
    let Some(edge) = edge else {
        return Classification::Unknown;
    };
    if edge.distance_m > radius_m {
        return Classification::Unknown;
    }

    let surface = edge.surface.as_deref();
    let highway = edge.highway.as_deref();

    if is_in(surface, PAVED_SURFACES) {
        return Classification::Paved;
    }
    if is_in(surface, UNPAVED_SURFACES) {
        return Classification::Unpaved;
    }
    // Past this point the surface is absent or in neither set
    if is_in(highway, PAVED_HIGHWAYS) {
        return Classification::Paved;
    }
    if is_in(highway, TRACK_LIKE_HIGHWAYS) {
        return if edge.tracktype.as_deref() == Some(PAVED_TRACK_GRADE) {
            Classification::Paved
        } else {
            Classification::Unpaved
        };
    }
    if is_in(highway, UTILITY_HIGHWAYS) {
        return if is_in(surface, PAVED_SURFACES) {
            Classification::Paved
        } else {
            Classification::Unknown
        };
    }

    Classification::Unknown
}
