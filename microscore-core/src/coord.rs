//! Geographic coordinates and great-circle distances.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`haversine_distance`], in metres.
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
///
/// # Examples
///
/// ```
/// use microscore_core::Coordinate;
///
/// # fn main() -> Result<(), microscore_core::CoordinateError> {
/// let obelisco = Coordinate::try_new(-34.6037, -58.3816)?;
/// assert_eq!(obelisco.distance_to(&obelisco), 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

/// Errors returned by [`Coordinate::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was not finite or fell outside `-90..=90`.
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),
    /// Longitude was not finite or fell outside `-180..=180`.
    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}

impl Coordinate {
    /// Construct a coordinate without validation.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validate and construct a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either component is non-finite or out
    /// of range.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in metres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance(*self, *other)
    }
}

impl From<Coordinate> for geo::Coord {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl From<geo::Coord> for Coordinate {
    fn from(value: geo::Coord) -> Self {
        Self::new(value.y, value.x)
    }
}

/// Great-circle distance between two coordinates in metres.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_METRES`].
#[expect(
    clippy::float_arithmetic,
    reason = "haversine distance is inherently floating-point"
)]
#[must_use]
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `h` fractionally above one for antipodal points.
    2.0 * EARTH_RADIUS_METRES * h.clamp(0.0, 1.0).sqrt().asin()
}
