//! Tunable settings for the engine.
//!
//! Every field has a default matching the behaviour the engine was tuned
//! with; callers override only what they need. The structure deserialises
//! from configuration files with missing fields falling back to defaults.

use std::time::Duration;

use microscore_core::{AddressLocale, PoiCategory, ScoringFunction};
use serde::{Deserialize, Serialize};

/// Default Nominatim base URL.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default Overpass interpreter mirrors, tried in order.
pub const DEFAULT_OVERPASS_ENDPOINTS: [&str; 2] = [
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass-api.de/api/interpreter",
];

/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = "microscore/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry rounds across all Overpass endpoints.
pub const DEFAULT_RETRY_ROUNDS: u32 = 4;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the geocoding service.
    pub nominatim_url: String,
    /// Interchangeable spatial-query endpoints, tried in order each round.
    pub overpass_endpoints: Vec<String>,
    /// User agent sent to both providers.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of retry rounds before a spatial query is abandoned.
    pub retry_rounds: u32,
    /// Request spacing, jitter and backoff.
    pub pacing: Pacing,
    /// Search radii per category.
    pub radii: SearchRadii,
    /// Locale appended to geocoder queries.
    pub locale: AddressLocale,
    /// Score weights, curves and penalties.
    pub scoring: ScoringFunction,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_owned(),
            overpass_endpoints: DEFAULT_OVERPASS_ENDPOINTS
                .iter()
                .map(|endpoint| (*endpoint).to_owned())
                .collect(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_rounds: DEFAULT_RETRY_ROUNDS,
            pacing: Pacing::default(),
            radii: SearchRadii::default(),
            locale: AddressLocale::default(),
            scoring: ScoringFunction::default(),
        }
    }
}

impl EngineConfig {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request spacing and backoff.
///
/// Jitter ratios add a random extra of up to `ratio × base` to each wait, so
/// the configured spacing is always a lower bound. Ratios above
/// [`MAX_JITTER_RATIO`](crate::pacing::MAX_JITTER_RATIO) are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Minimum gap between geocoder requests, in milliseconds.
    pub geocode_spacing_ms: u64,
    /// Jitter ratio for the geocoder gap.
    pub geocode_jitter: f64,
    /// Minimum gap between spatial-query requests, in milliseconds.
    pub overpass_spacing_ms: u64,
    /// Jitter ratio for the spatial-query gap.
    pub overpass_jitter: f64,
    /// Backoff after retry round `n` is `n × backoff_step_ms`.
    pub backoff_step_ms: u64,
    /// Jitter ratio for backoff sleeps.
    pub backoff_jitter: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            geocode_spacing_ms: 900,
            geocode_jitter: 0.3,
            overpass_spacing_ms: 1200,
            overpass_jitter: 0.3,
            backoff_step_ms: 700,
            backoff_jitter: 0.4,
        }
    }
}

impl Pacing {
    /// No waiting at all; useful against local stubs.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            geocode_spacing_ms: 0,
            geocode_jitter: 0.0,
            overpass_spacing_ms: 0,
            overpass_jitter: 0.0,
            backoff_step_ms: 0,
            backoff_jitter: 0.0,
        }
    }

    /// Minimum gap between geocoder requests.
    #[must_use]
    pub const fn geocode_spacing(&self) -> Duration {
        Duration::from_millis(self.geocode_spacing_ms)
    }

    /// Minimum gap between spatial-query requests.
    #[must_use]
    pub const fn overpass_spacing(&self) -> Duration {
        Duration::from_millis(self.overpass_spacing_ms)
    }

    /// Backoff unit multiplied by the round number.
    #[must_use]
    pub const fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// Search radii in metres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRadii {
    /// Radius used for every category except subway.
    pub default_m: u32,
    /// Escalating radii for subway access, tried until one finds a feature.
    pub subway_m: Vec<u32>,
}

impl Default for SearchRadii {
    fn default() -> Self {
        Self {
            default_m: 1500,
            subway_m: vec![1500, 2500, 4000],
        }
    }
}

impl SearchRadii {
    /// Radii to try for `category`, in order.
    #[must_use]
    pub fn for_category(&self, category: PoiCategory) -> &[u32] {
        match category {
            PoiCategory::Subway => &self.subway_m,
            PoiCategory::Park | PoiCategory::MajorRoad | PoiCategory::Railway => {
                std::slice::from_ref(&self.default_m)
            }
        }
    }
}
