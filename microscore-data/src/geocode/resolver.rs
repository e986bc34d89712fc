//! Variant-aware, cached and paced geocoding.

use log::debug;
use microscore_core::{AddressNormalizer, Coordinate};

use super::GeocodeSource;
use crate::cache::QueryCache;
use crate::config::Pacing;
use crate::pacing::RateGate;

/// Resolves addresses to coordinates through a [`GeocodeSource`].
///
/// Results, including misses, are cached by lowercased query text for the
/// lifetime of the geocoder. Requests are spaced by the geocoder's own
/// [`RateGate`].
#[derive(Debug)]
pub struct Geocoder<S> {
    source: S,
    normalizer: AddressNormalizer,
    gate: RateGate,
    cache: QueryCache<Option<Coordinate>>,
}

impl<S: GeocodeSource> Geocoder<S> {
    /// Create a geocoder with default pacing.
    #[must_use]
    pub fn new(source: S, normalizer: AddressNormalizer) -> Self {
        let pacing = Pacing::default();
        Self {
            source,
            normalizer,
            gate: RateGate::new(pacing.geocode_spacing(), pacing.geocode_jitter),
            cache: QueryCache::default(),
        }
    }

    /// Replace request spacing.
    #[must_use]
    pub fn with_pacing(mut self, pacing: &Pacing) -> Self {
        self.gate = RateGate::new(pacing.geocode_spacing(), pacing.geocode_jitter);
        self
    }

    /// Normalise `raw` and locate its first resolvable variant.
    pub async fn resolve(&self, raw: &str) -> Option<Coordinate> {
        let variants = self.normalizer.variants(raw);
        if variants.is_empty() {
            debug!("nothing to geocode in {raw:?}");
            return None;
        }
        self.locate(&variants).await
    }

    /// First coordinate found among `variants`, tried in order.
    ///
    /// A cached hit returns immediately and a cached miss skips to the next
    /// variant. Errors and empty answers are cached as misses.
    pub async fn locate(&self, variants: &[String]) -> Option<Coordinate> {
        for variant in variants {
            let key = variant.to_lowercase();
            match self.cache.get(&key) {
                Some(Some(hit)) => return Some(hit),
                Some(None) => continue,
                None => {}
            }

            let answer = {
                let _permit = self.gate.admit().await;
                self.source.search(variant).await
            };
            let found = match answer {
                Ok(matches) => matches.first().map(|candidate| candidate.coordinate),
                Err(err) => {
                    debug!("geocoding {variant:?} failed: {err}");
                    None
                }
            };
            if let Some(hit) = self.cache.insert_once(key, found) {
                return Some(hit);
            }
            debug!("no geocoder match for {variant:?}");
        }
        None
    }

    /// Source in use.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Normaliser producing query variants.
    #[must_use]
    pub const fn normalizer(&self) -> &AddressNormalizer {
        &self.normalizer
    }

    /// Number of distinct queries cached so far.
    #[must_use]
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}
