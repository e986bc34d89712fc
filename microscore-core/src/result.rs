//! The record handed back to collaborators for each address.

use crate::{Coordinate, DistanceSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of scoring one address.
///
/// A missing coordinate means geocoding failed; distances and score are then
/// absent too. Otherwise the score is always present and individual distances
/// are absent only when their category could not be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreResult {
    #[cfg_attr(feature = "serde", serde(rename = "lat"))]
    latitude: Option<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "lon"))]
    longitude: Option<f64>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    distances: DistanceSet,
    micro_score: Option<u8>,
}

impl ScoreResult {
    /// Result for an address that could not be geocoded.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Result for a geocoded address.
    ///
    /// Scores above 100 are clamped.
    #[must_use]
    pub fn resolved(coordinate: Coordinate, distances: DistanceSet, micro_score: u8) -> Self {
        Self {
            latitude: Some(coordinate.latitude),
            longitude: Some(coordinate.longitude),
            distances,
            micro_score: Some(micro_score.min(100)),
        }
    }

    /// Geocoded position, if any.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.latitude
            .zip(self.longitude)
            .map(|(latitude, longitude)| Coordinate::new(latitude, longitude))
    }

    /// Per-category distances.
    #[must_use]
    pub const fn distances(&self) -> &DistanceSet {
        &self.distances
    }

    /// Composite score in `0..=100`, absent when geocoding failed.
    #[must_use]
    pub const fn micro_score(&self) -> Option<u8> {
        self.micro_score
    }

    /// Report whether the address was geocoded.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.latitude.is_some()
    }
}
