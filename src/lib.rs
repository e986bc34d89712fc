//! Facade crate for the micro-score engine.
//!
//! This crate re-exports the core domain types and, behind the `engine`
//! feature, the provider-backed engine that turns raw addresses into scores.

#![forbid(unsafe_code)]

pub use microscore_core::{
    AddressLocale, AddressNormalizer, Coordinate, CoordinateError, DistanceSet, PoiCategory,
    ScoreResult, ScoringFunction, build_address_variants, haversine_distance, normalize_address,
    proximity_score,
};

#[cfg(feature = "engine")]
pub use microscore_data::{
    EngineBuildError, EngineConfig, HttpMicroScoreEngine, MicroScoreEngine, Pacing, SearchRadii,
};
