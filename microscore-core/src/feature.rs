//! Features returned by a spatial query and nearest-distance search.

use geo::Coord;

use crate::{Coordinate, haversine_distance};

/// Geometry kind of a returned feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// A single tagged point.
    Node,
    /// A line or area.
    Way,
    /// A grouping of other features.
    Relation,
    /// Any other element type a provider may return, such as an area.
    Other,
}

/// A feature reduced to the point used for distance measurement.
///
/// Points come from a node's own position or from the centre a provider
/// precomputes for ways and relations. Features without a usable point are
/// kept so callers can tell "nothing nearby" apart from "nothing measurable".
/// Points use `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFeature {
    /// Geometry kind.
    pub kind: FeatureKind,
    /// Representative point, if one was supplied.
    pub point: Option<Coord<f64>>,
}

impl SpatialFeature {
    /// A feature of `kind` at an optional `point`.
    #[must_use]
    pub fn new(kind: FeatureKind, point: Option<Coordinate>) -> Self {
        Self {
            kind,
            point: point.map(Coord::from),
        }
    }

    /// A point feature at `point`.
    #[must_use]
    pub fn node(point: Coordinate) -> Self {
        Self::new(FeatureKind::Node, Some(point))
    }

    /// An extended feature whose centre is `center`.
    #[must_use]
    pub fn way(center: Coordinate) -> Self {
        Self::new(FeatureKind::Way, Some(center))
    }

    /// The representative point as a coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.point.map(Coordinate::from)
    }
}

/// Minimum haversine distance from `origin` to any feature with a point.
///
/// Returns `None` when no feature carries a usable point.
#[must_use]
pub fn nearest_distance<'a, I>(origin: Coordinate, features: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    features
        .into_iter()
        .filter_map(SpatialFeature::coordinate)
        .map(|point| haversine_distance(origin, point))
        .filter(|distance| distance.is_finite())
        .reduce(f64::min)
}
