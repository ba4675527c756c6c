//! Distance metrics and k-nearest combine strategies.
//!
//! A [`DistanceFunction`] maps a fractional offset to a scalar distance; a
//! [`CombineFunction`] declares how many nearest distances it needs and folds
//! the sorted array into one output value. Both are pluggable, data-only
//! strategies shared by [`CellNoise`] and [`DistanceField`].
//!
//! [`CellNoise`]: crate::noise::CellNoise
//! [`DistanceField`]: crate::distfield::DistanceField
use crate::error::{Error, Result};

/// Maps two fractional offsets to a scalar distance.
pub trait DistanceFunction: Send + Sync {
    fn distance(&self, dx: f32, dy: f32) -> f32;

    /// Whether [`DistanceFunction::distance`] returns a squared value whose
    /// square root is deferred to the finalization pass.
    ///
    /// While this is set, cutoffs must be compared squared and sorting stays
    /// valid because both sides are consistently squared.
    fn defers_sqrt(&self) -> bool {
        false
    }

    /// Whether nearest-candidate scans need a widened search radius to be
    /// correct under this metric (e.g. Minkowski with p < 1).
    fn needs_wide_search(&self) -> bool {
        false
    }
}

/// Euclidean metric with the square root deferred: returns `dx^2 + dy^2`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquaredEuclidean;

impl DistanceFunction for SquaredEuclidean {
    fn distance(&self, dx: f32, dy: f32) -> f32 {
        dx * dx + dy * dy
    }

    fn defers_sqrt(&self) -> bool {
        true
    }
}

/// Manhattan metric: `|dx| + |dy|`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Manhattan;

impl DistanceFunction for Manhattan {
    fn distance(&self, dx: f32, dy: f32) -> f32 {
        dx.abs() + dy.abs()
    }
}

/// Chebyshev metric: `max(|dx|, |dy|)`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chebyshev;

impl DistanceFunction for Chebyshev {
    fn distance(&self, dx: f32, dy: f32) -> f32 {
        dx.abs().max(dy.abs())
    }
}

/// Minkowski metric: `(|dx|^p + |dy|^p)^(1/p)`.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Minkowski {
    p: f32,
}

impl Minkowski {
    pub fn new(p: f32) -> Result<Self> {
        if !p.is_finite() || p <= 0.0 {
            return Err(Error::InvalidOperand(format!(
                "Minkowski exponent must be finite and > 0, got {p}"
            )));
        }
        Ok(Self { p })
    }

    pub fn p(&self) -> f32 {
        self.p
    }
}

impl DistanceFunction for Minkowski {
    fn distance(&self, dx: f32, dy: f32) -> f32 {
        (dx.abs().powf(self.p) + dy.abs().powf(self.p)).powf(1.0 / self.p)
    }

    fn needs_wide_search(&self) -> bool {
        // Concave unit balls put the nearest site outside the 1-cell ring.
        self.p < 1.0
    }
}

/// Maps a sorted array of the `k` nearest distances to one output value.
pub trait CombineFunction: Send + Sync {
    /// How many nearest distances [`CombineFunction::combine`] needs.
    fn k(&self) -> usize;

    /// Fold `distances` (ascending, length [`CombineFunction::k`]) into one value.
    fn combine(&self, distances: &[f32]) -> f32;
}

/// The nearest distance (F1).
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nearest;

impl CombineFunction for Nearest {
    fn k(&self) -> usize {
        1
    }

    fn combine(&self, distances: &[f32]) -> f32 {
        distances[0]
    }
}

/// The second-nearest distance (F2).
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecondNearest;

impl CombineFunction for SecondNearest {
    fn k(&self) -> usize {
        2
    }

    fn combine(&self, distances: &[f32]) -> f32 {
        distances[1]
    }
}

/// Cell-border emphasis: `F2 - F1`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct F2MinusF1;

impl CombineFunction for F2MinusF1 {
    fn k(&self) -> usize {
        2
    }

    fn combine(&self, distances: &[f32]) -> f32 {
        distances[1] - distances[0]
    }
}

/// Ratio `F1 / F2`, 1.0 when both distances vanish.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearestRatio;

impl CombineFunction for NearestRatio {
    fn k(&self) -> usize {
        2
    }

    fn combine(&self, distances: &[f32]) -> f32 {
        if distances[1] <= f32::EPSILON {
            1.0
        } else {
            distances[0] / distances[1]
        }
    }
}
