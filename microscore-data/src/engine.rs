//! Address-to-score orchestration.

use std::time::Duration;

use log::{debug, info};
use microscore_core::{AddressNormalizer, ScoreResult, ScoringFunction};
use reqwest::Client;
use thiserror::Error;
use tokio::time::sleep;

use crate::config::{EngineConfig, Pacing};
use crate::geocode::{GeocodeSource, Geocoder, NominatimSource};
use crate::overpass::{HttpOverpassTransport, OverpassClient, OverpassTransport, PoiDistanceResolver};
use crate::pacing::jittered;

/// Errors raised while assembling the HTTP-backed engine.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Engine wired to Nominatim and Overpass over HTTP.
pub type HttpMicroScoreEngine = MicroScoreEngine<NominatimSource, HttpOverpassTransport>;

/// Scores addresses by geocoding them and measuring nearby features.
///
/// One engine should serve a whole run so its caches and rate gates are
/// shared across addresses. The gates belong to the engine, so a process
/// must not drive two engines against the same providers at once.
#[derive(Debug)]
pub struct MicroScoreEngine<G, T> {
    geocoder: Geocoder<G>,
    resolver: PoiDistanceResolver<T>,
    scoring: ScoringFunction,
    courtesy: Duration,
    courtesy_jitter: f64,
}

impl HttpMicroScoreEngine {
    /// Build the HTTP stack described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineBuildError::HttpClient`] when the HTTP client cannot
    /// be constructed, for example when no TLS backend is available.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineBuildError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()?;
        let source = NominatimSource::new(client.clone(), config.nominatim_url.clone());
        let transport = HttpOverpassTransport::new(client);
        Ok(Self::with_sources(source, transport, config))
    }
}

impl<G: GeocodeSource, T: OverpassTransport> MicroScoreEngine<G, T> {
    /// Assemble an engine from prepared parts.
    ///
    /// `pacing` supplies the courtesy pause taken after each successful
    /// geocode.
    #[must_use]
    pub const fn new(
        geocoder: Geocoder<G>,
        resolver: PoiDistanceResolver<T>,
        scoring: ScoringFunction,
        pacing: &Pacing,
    ) -> Self {
        Self {
            geocoder,
            resolver,
            scoring,
            courtesy: pacing.geocode_spacing(),
            courtesy_jitter: pacing.geocode_jitter,
        }
    }

    /// Assemble an engine around arbitrary providers using `config`.
    #[must_use]
    pub fn with_sources(source: G, transport: T, config: &EngineConfig) -> Self {
        let geocoder = Geocoder::new(source, AddressNormalizer::new(config.locale.clone()))
            .with_pacing(&config.pacing);
        let client = OverpassClient::new(transport, config.overpass_endpoints.clone())
            .with_pacing(&config.pacing)
            .with_retry_rounds(config.retry_rounds);
        let resolver = PoiDistanceResolver::new(client, config.radii.clone());
        Self::new(geocoder, resolver, config.scoring, &config.pacing)
    }

    /// Score one raw address.
    ///
    /// Never fails: an address that cannot be geocoded yields
    /// [`ScoreResult::unresolved`], and distances that cannot be measured
    /// are absent from the result.
    pub async fn score_address(&self, raw: &str) -> ScoreResult {
        let Some(coordinate) = self.geocoder.resolve(raw).await else {
            info!("could not geocode {raw:?}");
            return ScoreResult::unresolved();
        };

        sleep(jittered(self.courtesy, self.courtesy_jitter)).await;

        let distances = self.resolver.distances(coordinate).await;
        if !distances.is_complete() {
            debug!(
                "partial distances at ({:.5}, {:.5}): subway={:?} park={:?} major_road={:?} railway={:?}",
                coordinate.latitude,
                coordinate.longitude,
                distances.subway,
                distances.park,
                distances.major_road,
                distances.railway,
            );
        }
        let score = self.scoring.score(&distances);
        ScoreResult::resolved(coordinate, distances, score)
    }

    /// Geocoder stage.
    #[must_use]
    pub const fn geocoder(&self) -> &Geocoder<G> {
        &self.geocoder
    }

    /// Distance stage.
    #[must_use]
    pub const fn resolver(&self) -> &PoiDistanceResolver<T> {
        &self.resolver
    }

    /// Scoring function in use.
    #[must_use]
    pub const fn scoring(&self) -> &ScoringFunction {
        &self.scoring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::{OverpassElement, OverpassResponse};
    use crate::test_support::{Reply, StubGeocodeSource, StubOverpassTransport};
    use microscore_core::{Coordinate, PoiCategory};
    use rstest::{fixture, rstest};

    const ADDRESS: &str = "Gorriti 450, Palermo";
    const QUERY: &str = "Gorriti 450, Palermo, CABA, Argentina";

    #[fixture]
    fn origin() -> Coordinate {
        Coordinate::new(-34.5889, -58.4301)
    }

    fn config() -> EngineConfig {
        EngineConfig {
            overpass_endpoints: vec!["https://overpass.example/api/interpreter".to_owned()],
            retry_rounds: 1,
            pacing: Pacing::immediate(),
            ..EngineConfig::default()
        }
    }

    fn park_next_door(origin: Coordinate) -> Reply {
        Reply::Elements(OverpassResponse::new(vec![OverpassElement::way(
            7,
            origin.latitude + 0.0005,
            origin.longitude,
        )]))
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn unresolvable_addresses_yield_the_empty_result() {
        let engine = MicroScoreEngine::with_sources(
            StubGeocodeSource::new(),
            StubOverpassTransport::new(),
            &config(),
        );

        let result = engine.score_address("Calle Inexistente 1").await;

        assert_eq!(result, ScoreResult::unresolved());
        assert_eq!(engine.resolver().client().cached_queries(), 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn resolved_addresses_carry_coordinate_distances_and_score(origin: Coordinate) {
        let engine = MicroScoreEngine::with_sources(
            StubGeocodeSource::new().with_match(QUERY, origin),
            StubOverpassTransport::new().on_query("leisure", park_next_door(origin)),
            &config(),
        );

        let result = engine.score_address(ADDRESS).await;

        assert_eq!(result.coordinate(), Some(origin));
        let park = result
            .distances()
            .get(PoiCategory::Park)
            .expect("park should resolve");
        assert!(park < 100.0, "{park}");
        assert_eq!(result.distances().get(PoiCategory::Subway), None);
        // Park at full proximity and the bias only.
        assert_eq!(result.micro_score(), Some(70));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn courtesy_pause_follows_a_successful_geocode(origin: Coordinate) {
        let pacing = Pacing {
            geocode_spacing_ms: 900,
            ..Pacing::immediate()
        };
        let config = EngineConfig {
            pacing,
            ..config()
        };
        let engine = MicroScoreEngine::with_sources(
            StubGeocodeSource::new().with_match(QUERY, origin),
            StubOverpassTransport::new(),
            &config,
        );
        let start = tokio::time::Instant::now();

        engine.score_address(ADDRESS).await;

        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn oversized_jitter_from_settings_does_not_abort_scoring(origin: Coordinate) {
        let mut config: EngineConfig = serde_json::from_str(
            r#"{"pacing":{"geocode_spacing_ms":900,"geocode_jitter":1e30,"overpass_spacing_ms":0,"backoff_step_ms":0},"retry_rounds":1}"#,
        )
        .expect("settings should parse");
        config.overpass_endpoints = vec!["https://overpass.example/api/interpreter".to_owned()];
        let engine = MicroScoreEngine::with_sources(
            StubGeocodeSource::new().with_match(QUERY, origin),
            StubOverpassTransport::new(),
            &config,
        );
        let start = tokio::time::Instant::now();

        let result = engine.score_address(ADDRESS).await;

        assert_eq!(result.coordinate(), Some(origin));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(900), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(3600), "{elapsed:?}");
    }
}
