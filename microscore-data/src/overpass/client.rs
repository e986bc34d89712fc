//! Paced, cached Overpass client with endpoint failover.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, warn};
use microscore_core::SpatialFeature;
use tokio::time::sleep;

use super::{OverpassElement, OverpassQuery, OverpassTransport};
use crate::cache::QueryCache;
use crate::config::{DEFAULT_RETRY_ROUNDS, Pacing};
use crate::pacing::{RateGate, jittered};

/// One-shot diagnostic for exhausted spatial queries.
///
/// The first claim wins and is logged; later claims are only counted.
#[derive(Debug, Default)]
pub struct ExhaustionNotice {
    reported: AtomicBool,
    suppressed: AtomicUsize,
}

impl ExhaustionNotice {
    /// A notice nobody has claimed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reported: AtomicBool::new(false),
            suppressed: AtomicUsize::new(0),
        }
    }

    /// Whether the caller is the first to report exhaustion.
    fn claim(&self) -> bool {
        let first = !self.reported.swap(true, Ordering::Relaxed);
        if !first {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
        }
        first
    }

    /// Whether an exhaustion has been reported.
    #[must_use]
    pub fn reported(&self) -> bool {
        self.reported.load(Ordering::Relaxed)
    }

    /// Exhaustions that went unlogged because one was already reported.
    #[must_use]
    pub fn suppressed(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }
}

/// Notice shared by every client in the process unless replaced.
pub static PROCESS_EXHAUSTION_NOTICE: ExhaustionNotice = ExhaustionNotice::new();

/// Client spreading queries over interchangeable interpreter endpoints.
///
/// Every request passes the client's [`RateGate`], so concurrent callers
/// share one spacing budget. Results are cached by
/// [`OverpassQuery::cache_key`] for the lifetime of the client. Exhaustion
/// is logged through [`PROCESS_EXHAUSTION_NOTICE`], so the warning appears
/// once per process however many clients exist. The gate is not shared
/// between clients; a process should drive one client per provider.
#[derive(Debug)]
pub struct OverpassClient<T> {
    transport: T,
    endpoints: Vec<String>,
    gate: RateGate,
    cache: QueryCache<Vec<SpatialFeature>>,
    retry_rounds: u32,
    backoff_step: Duration,
    backoff_jitter: f64,
    exhausted: AtomicBool,
    notice: &'static ExhaustionNotice,
}

impl<T: OverpassTransport> OverpassClient<T> {
    /// Create a client over `endpoints` with default pacing.
    #[must_use]
    pub fn new(transport: T, endpoints: Vec<String>) -> Self {
        let pacing = Pacing::default();
        Self {
            transport,
            endpoints,
            gate: RateGate::new(pacing.overpass_spacing(), pacing.overpass_jitter),
            cache: QueryCache::default(),
            retry_rounds: DEFAULT_RETRY_ROUNDS,
            backoff_step: pacing.backoff_step(),
            backoff_jitter: pacing.backoff_jitter,
            exhausted: AtomicBool::new(false),
            notice: &PROCESS_EXHAUSTION_NOTICE,
        }
    }

    /// Replace request spacing and backoff.
    #[must_use]
    pub fn with_pacing(mut self, pacing: &Pacing) -> Self {
        self.gate = RateGate::new(pacing.overpass_spacing(), pacing.overpass_jitter);
        self.backoff_step = pacing.backoff_step();
        self.backoff_jitter = pacing.backoff_jitter;
        self
    }

    /// Log exhaustion through `notice` instead of the process-wide one.
    #[must_use]
    pub const fn with_exhaustion_notice(mut self, notice: &'static ExhaustionNotice) -> Self {
        self.notice = notice;
        self
    }

    /// Replace the number of retry rounds.
    #[must_use]
    pub const fn with_retry_rounds(mut self, rounds: u32) -> Self {
        self.retry_rounds = rounds;
        self
    }

    /// Features matching `query`.
    ///
    /// Each round tries every endpoint once in order. Error statuses,
    /// transport failures, malformed bodies and empty element lists all move
    /// on to the next endpoint immediately; rounds are separated by a
    /// backoff growing with the round number. The first non-empty answer is
    /// cached and returned. When every round fails the query is cached as
    /// empty, and the first such exhaustion is logged at warn level.
    pub async fn elements(&self, query: &OverpassQuery) -> Vec<SpatialFeature> {
        let key = query.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let mut last_failure = None;
        for round in 0..self.retry_rounds {
            if round > 0 {
                let pause = jittered(self.backoff_step.saturating_mul(round), self.backoff_jitter);
                debug!("overpass round {round} failed; backing off for {pause:?}");
                sleep(pause).await;
            }
            for endpoint in &self.endpoints {
                let outcome = {
                    let _permit = self.gate.admit().await;
                    self.transport.execute(endpoint, query.text()).await
                };
                match outcome {
                    Ok(response) if !response.elements.is_empty() => {
                        let features = response
                            .elements
                            .iter()
                            .map(OverpassElement::to_feature)
                            .collect();
                        return self.cache.insert_once(key, features);
                    }
                    Ok(_) => {
                        debug!("{endpoint} returned no elements");
                        last_failure = Some(format!("{endpoint} returned no elements"));
                    }
                    Err(err) => {
                        if err.is_refusal() {
                            debug!("{err}; moving to the next endpoint");
                        } else {
                            debug!("{err}");
                        }
                        last_failure = Some(err.to_string());
                    }
                }
            }
        }

        self.exhausted.store(true, Ordering::Relaxed);
        if self.notice.claim() {
            let reason = last_failure.as_deref().unwrap_or("no endpoints configured");
            warn!(
                "overpass exhausted after {} rounds: {reason}",
                self.retry_rounds
            );
        }
        self.cache.insert_once(key, Vec::new())
    }

    /// Whether any query on this client ran out of rounds.
    #[must_use]
    pub fn has_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }

    /// Number of distinct queries cached so far.
    #[must_use]
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    /// Transport in use.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Configured endpoints, in failover order.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}
