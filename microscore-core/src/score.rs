//! Turn per-category distances into a 0–100 micro-score.
//!
//! Scoring is a pure function of a [`DistanceSet`]. Parks and subway access
//! add desirability through a piecewise-linear proximity curve; closeness to
//! major roads and rail lines subtracts fixed penalties. The weights and
//! thresholds are product decisions and are exposed as overridable defaults
//! rather than derived values.

use crate::DistanceSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proximity value reached at the `mid` threshold.
const MID_PLATEAU: f64 = 0.85;

/// Thresholds of the piecewise-linear proximity curve, in metres.
///
/// The curve is 1.0 up to `near`, falls linearly to 0.85 at `mid`, then to
/// 0.0 at `far`, and stays at 0.0 beyond.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProximityCurve {
    /// Distance at or below which proximity is perfect.
    pub near: f64,
    /// Distance at which proximity has eased to 0.85.
    pub mid: f64,
    /// Distance at which proximity reaches zero.
    pub far: f64,
}

impl Default for ProximityCurve {
    fn default() -> Self {
        Self {
            near: 100.0,
            mid: 500.0,
            far: 1000.0,
        }
    }
}

impl ProximityCurve {
    /// Evaluate the curve at `distance`. Absent distances score zero.
    #[must_use]
    pub fn score(&self, distance: Option<f64>) -> f64 {
        proximity_score(distance, self.near, self.mid, self.far)
    }
}

/// Piecewise-linear proximity of `distance` given three thresholds.
///
/// # Examples
///
/// ```
/// use microscore_core::proximity_score;
///
/// assert_eq!(proximity_score(Some(50.0), 100.0, 500.0, 1000.0), 1.0);
/// assert_eq!(proximity_score(None, 100.0, 500.0, 1000.0), 0.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "linear interpolation between thresholds"
)]
#[must_use]
pub fn proximity_score(distance: Option<f64>, near: f64, mid: f64, far: f64) -> f64 {
    let Some(d) = distance.filter(|d| d.is_finite()) else {
        return 0.0;
    };
    if d <= near {
        1.0
    } else if d <= mid {
        1.0 - (1.0 - MID_PLATEAU) * ((d - near) / (mid - near))
    } else if d <= far {
        MID_PLATEAU * (1.0 - (d - mid) / (far - mid))
    } else {
        0.0
    }
}

/// Weights of the positive score components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoreWeights {
    /// Weight of park proximity.
    pub park: f64,
    /// Weight of subway proximity.
    pub subway: f64,
    /// Constant baseline added to every resolved address.
    pub bias: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            park: 0.60,
            subway: 0.30,
            bias: 0.10,
        }
    }
}

/// Penalty applied when a nuisance feature is close.
///
/// Distances strictly below `severe_within` subtract `severe`; distances
/// strictly below `mild_within` subtract `mild`. Penalties are magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PenaltyBands {
    /// Upper bound of the severe band, in metres.
    pub severe_within: f64,
    /// Upper bound of the mild band, in metres.
    pub mild_within: f64,
    /// Amount subtracted inside the severe band.
    pub severe: f64,
    /// Amount subtracted inside the mild band.
    pub mild: f64,
}

impl PenaltyBands {
    /// Default bands for motorways, trunk and primary roads.
    pub const MAJOR_ROAD: Self = Self {
        severe_within: 80.0,
        mild_within: 150.0,
        severe: 0.25,
        mild: 0.10,
    };

    /// Default bands for rail lines.
    pub const RAILWAY: Self = Self {
        severe_within: 80.0,
        mild_within: 150.0,
        severe: 0.15,
        mild: 0.05,
    };

    /// Penalty magnitude for `distance`; absent distances cost nothing.
    #[must_use]
    pub fn penalty(&self, distance: Option<f64>) -> f64 {
        match distance {
            Some(d) if d < self.severe_within => self.severe,
            Some(d) if d < self.mild_within => self.mild,
            _ => 0.0,
        }
    }
}

/// Composite micro-score over a [`DistanceSet`].
///
/// # Examples
///
/// ```
/// use microscore_core::{DistanceSet, ScoringFunction};
///
/// let scoring = ScoringFunction::default();
/// assert_eq!(scoring.score(&DistanceSet::default()), 10);
///
/// let ideal = DistanceSet {
///     subway: Some(50.0),
///     park: Some(50.0),
///     ..DistanceSet::default()
/// };
/// assert_eq!(scoring.score(&ideal), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringFunction {
    /// Curve applied to park distance.
    pub park_curve: ProximityCurve,
    /// Curve applied to subway distance.
    pub subway_curve: ProximityCurve,
    /// Component weights.
    pub weights: ScoreWeights,
    /// Penalty for proximity to major roads.
    pub major_road: PenaltyBands,
    /// Penalty for proximity to rail lines.
    pub railway: PenaltyBands,
}

impl Default for ScoringFunction {
    fn default() -> Self {
        Self {
            park_curve: ProximityCurve::default(),
            subway_curve: ProximityCurve::default(),
            weights: ScoreWeights::default(),
            major_road: PenaltyBands::MAJOR_ROAD,
            railway: PenaltyBands::RAILWAY,
        }
    }
}

impl ScoringFunction {
    /// Unclamped weighted sum of proximities and penalties.
    #[expect(clippy::float_arithmetic, reason = "weighted sum of components")]
    #[must_use]
    pub fn raw(&self, distances: &DistanceSet) -> f64 {
        let park = self.park_curve.score(distances.park);
        let subway = self.subway_curve.score(distances.subway);
        let base = self.weights.park * park + self.weights.subway * subway + self.weights.bias;
        base - self.major_road.penalty(distances.major_road) - self.railway.penalty(distances.railway)
    }

    /// Integer micro-score in `0..=100`.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to 0..=1 before scaling to a percentage"
    )]
    #[must_use]
    pub fn score(&self, distances: &DistanceSet) -> u8 {
        let raw = self.raw(distances);
        let clamped = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
        (clamped * 100.0).round() as u8
    }
}
