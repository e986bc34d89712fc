//! Overpass JSON payload types.

use microscore_core::{Coordinate, FeatureKind, SpatialFeature};
use serde::{Deserialize, Serialize};

/// Body of an `[out:json]` response.
///
/// Only `elements` is read; a payload without it decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    /// Returned elements.
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

impl OverpassResponse {
    /// Wrap a list of elements.
    #[must_use]
    pub const fn new(elements: Vec<OverpassElement>) -> Self {
        Self { elements }
    }
}

/// OSM element type as reported by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Point element.
    Node,
    /// Line or area element.
    Way,
    /// Grouping element.
    Relation,
    /// Anything else, such as derived areas.
    #[serde(other)]
    Other,
}

impl From<ElementKind> for FeatureKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Node => Self::Node,
            ElementKind::Way => Self::Way,
            ElementKind::Relation => Self::Relation,
            ElementKind::Other => Self::Other,
        }
    }
}

/// Plain latitude/longitude pair as used by `center` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    fn to_coordinate(self) -> Option<Coordinate> {
        Coordinate::try_new(self.lat, self.lon).ok()
    }
}

/// One element of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassElement {
    /// Element type.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// OSM identifier.
    #[serde(default)]
    pub id: u64,
    /// Latitude, present on nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude, present on nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Precomputed centre, present on ways and relations with `out center`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
}

impl OverpassElement {
    /// A node at `lat`/`lon`.
    #[must_use]
    pub const fn node(id: u64, lat: f64, lon: f64) -> Self {
        Self {
            kind: ElementKind::Node,
            id,
            lat: Some(lat),
            lon: Some(lon),
            center: None,
        }
    }

    /// A way whose centre is `lat`/`lon`.
    #[must_use]
    pub const fn way(id: u64, lat: f64, lon: f64) -> Self {
        Self {
            kind: ElementKind::Way,
            id,
            lat: None,
            lon: None,
            center: Some(LatLon { lat, lon }),
        }
    }

    /// Point used for distance measurement.
    ///
    /// Nodes use their own position. Other kinds prefer `center` and fall
    /// back to their own position when the interpreter supplied one.
    #[must_use]
    pub fn representative_point(&self) -> Option<Coordinate> {
        let own = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => LatLon { lat, lon }.to_coordinate(),
            _ => None,
        };
        match self.kind {
            ElementKind::Node => own,
            _ => self.center.and_then(LatLon::to_coordinate).or(own),
        }
    }

    /// Reduce to the domain feature type.
    #[must_use]
    pub fn to_feature(&self) -> SpatialFeature {
        SpatialFeature::new(self.kind.into(), self.representative_point())
    }
}
