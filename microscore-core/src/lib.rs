//! Core domain types for the micro-score engine.
//!
//! This crate holds everything that can be computed without talking to a
//! network service: coordinates and great-circle distances, address
//! normalisation, the point-of-interest categories and their distance sets,
//! and the scoring function that turns distances into a 0–100 micro-score.
//!
//! Provider adapters and the orchestrating engine live in `microscore-data`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
mod category;
mod coord;
mod feature;
mod result;
pub mod score;

pub use address::{AddressLocale, AddressNormalizer, build_address_variants, normalize_address};
pub use category::{DistanceSet, PoiCategory};
pub use coord::{Coordinate, CoordinateError, EARTH_RADIUS_METRES, haversine_distance};
pub use feature::{FeatureKind, SpatialFeature, nearest_distance};
pub use result::ScoreResult;
pub use score::{PenaltyBands, ProximityCurve, ScoreWeights, ScoringFunction, proximity_score};
