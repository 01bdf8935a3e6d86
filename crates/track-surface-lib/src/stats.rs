//! Distance-weighted aggregation of classified segments

use crate::classify::Classification;
use crate::{Result, SurfaceError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Running per-class length sums in meters
///
/// `Totals` form a monoid under `+`, so partial sums over independent slices
/// of a track can be merged in any grouping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Totals {
    pub paved_m: f64,
    pub unpaved_m: f64,
    pub unknown_m: f64,
}

impl Totals {
    /// Add one classified length
    #[inline]
    pub fn with(mut self, classification: Classification, length_m: f64) -> Self {
        match classification {
            Classification::Paved => self.paved_m += length_m,
            Classification::Unpaved => self.unpaved_m += length_m,
            Classification::Unknown => self.unknown_m += length_m,
        }
        self
    }

    /// Left-to-right fold over (classification, length) pairs
    pub fn from_lengths<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Classification, f64)>,
    {
        items
            .into_iter()
            .fold(Self::default(), |totals, (classification, length_m)| {
                totals.with(classification, length_m)
            })
    }

    #[inline]
    pub fn get(&self, classification: Classification) -> f64 {
        match classification {
            Classification::Paved => self.paved_m,
            Classification::Unpaved => self.unpaved_m,
            Classification::Unknown => self.unknown_m,
        }
    }

    #[inline]
    pub fn total_m(&self) -> f64 {
        self.paved_m + self.unpaved_m + self.unknown_m
    }

    /// Turn the sums into final statistics
    ///
    /// # Errors
    /// [`SurfaceError::ZeroTotalDistance`] when nothing was accumulated, as
    /// percentages would be undefined.
    pub fn finish(self) -> Result<AggregateStats> {
        let total_m = self.total_m();
        if total_m <= 0.0 {
            return Err(SurfaceError::ZeroTotalDistance);
        }

        let percent = |part: f64| part / total_m * 100.0;
        Ok(AggregateStats {
            totals: self,
            total_m,
            paved_pct: percent(self.paved_m),
            unpaved_pct: percent(self.unpaved_m),
            unknown_pct: percent(self.unknown_m),
        })
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, other: Totals) -> Totals {
        Totals {
            paved_m: self.paved_m + other.paved_m,
            unpaved_m: self.unpaved_m + other.unpaved_m,
            unknown_m: self.unknown_m + other.unknown_m,
        }
    }
}

/// Final per-class lengths and percentages of a track
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregateStats {
    pub totals: Totals,
    /// Grand total in meters, always > 0
    pub total_m: f64,
    pub paved_pct: f64,
    pub unpaved_pct: f64,
    pub unknown_pct: f64,
}

impl AggregateStats {
    #[inline]
    pub fn length_m(&self, classification: Classification) -> f64 {
        self.totals.get(classification)
    }

    #[inline]
    pub fn percentage(&self, classification: Classification) -> f64 {
        match classification {
            Classification::Paved => self.paved_pct,
            Classification::Unpaved => self.unpaved_pct,
            Classification::Unknown => self.unknown_pct,
        }
    }
}

impl fmt::Display for AggregateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total distance: {:.2} km", self.total_m / 1000.0)?;
        for classification in Classification::ALL {
            writeln!(
                f,
                "{:<8} {:>9.2} km ({:>6.2}%)",
                format!("{classification}:"),
                self.length_m(classification) / 1000.0,
                self.percentage(classification)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages() {
        let stats = Totals::from_lengths([
            (Classification::Paved, 100.0),
            (Classification::Unpaved, 200.0),
            (Classification::Unknown, 300.0),
        ])
        .finish()
        .unwrap();

        assert!((stats.total_m - 600.0).abs() < 1e-9);
        assert!((stats.paved_pct - 16.67).abs() < 0.01);
        assert!((stats.unpaved_pct - 33.33).abs() < 0.01);
        assert!((stats.unknown_pct - 50.0).abs() < 0.01);
        let sum = stats.paved_pct + stats.unpaved_pct + stats.unknown_pct;
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_sum_to_grand_total() {
        let lengths: Vec<(Classification, f64)> = (0..1000)
            .map(|i| (Classification::ALL[i % 3], 0.1 + (i as f64 * 0.37) % 13.0))
            .collect();
        let stats = Totals::from_lengths(lengths.iter().copied()).finish().unwrap();
        let expected: f64 = lengths.iter().map(|(_, l)| l).sum();
        let parts: f64 = Classification::ALL
            .iter()
            .map(|&c| stats.length_m(c))
            .sum();
        assert!((parts - stats.total_m).abs() < 1e-6);
        assert!((expected - stats.total_m).abs() < 1e-6);
    }

    #[test]
    fn test_partial_sums_merge() {
        let lengths = [
            (Classification::Paved, 12.5),
            (Classification::Unknown, 3.0),
            (Classification::Paved, 7.5),
            (Classification::Unpaved, 40.0),
        ];
        let whole = Totals::from_lengths(lengths);
        let merged = Totals::from_lengths(lengths[..2].iter().copied())
            + Totals::from_lengths(lengths[2..].iter().copied());
        assert!((whole.paved_m - merged.paved_m).abs() < 1e-12);
        assert!((whole.unpaved_m - merged.unpaved_m).abs() < 1e-12);
        assert!((whole.unknown_m - merged.unknown_m).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_is_an_error() {
        assert!(matches!(
            Totals::default().finish(),
            Err(SurfaceError::ZeroTotalDistance)
        ));
        assert!(matches!(
            Totals::from_lengths([(Classification::Paved, 0.0)]).finish(),
            Err(SurfaceError::ZeroTotalDistance)
        ));
    }

    #[test]
    fn test_display() {
        let stats = Totals::from_lengths([
            (Classification::Paved, 1500.0),
            (Classification::Unpaved, 500.0),
        ])
        .finish()
        .unwrap();

        let text = stats.to_string();
        let lines: Vec<String> = text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(
            lines,
            vec![
                "Total distance: 2.00 km",
                "paved: 1.50 km ( 75.00%)",
                "unpaved: 0.50 km ( 25.00%)",
                "unknown: 0.00 km ( 0.00%)",
            ]
        );
    }
}
