//! Provider adapters and orchestration for the micro-score engine.
//!
//! Responsibilities:
//! - Resolve addresses to coordinates through a Nominatim-style geocoder.
//! - Query an Overpass-style spatial service for nearby features, spreading
//!   attempts over mirror endpoints with bounded retry rounds.
//! - Pace requests per provider and cache results for the lifetime of a run.
//! - Compose everything into [`MicroScoreEngine`], the entry point consumed
//!   by listing collectors.
//!
//! Boundaries:
//! - Domain rules (normalisation, distances, scoring) live in
//!   `microscore-core`.
//! - Nothing here returns an error for a single address; provider failures
//!   degrade to absent fields on the resulting record.
//!
//! Invariants:
//! - At most one request is in flight per provider, and consecutive requests
//!   are spaced by the configured interval.
//! - Cache entries are written once per key and never evicted.

mod cache;
pub mod config;
pub mod engine;
pub mod geocode;
pub mod overpass;
mod pacing;

#[doc(hidden)]
pub mod test_support;

pub use config::{EngineConfig, Pacing, SearchRadii};
pub use engine::{EngineBuildError, HttpMicroScoreEngine, MicroScoreEngine};
pub use pacing::{GatePermit, MAX_JITTER_RATIO, RateGate, jittered};
