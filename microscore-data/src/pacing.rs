//! Request pacing shared by concurrent callers of one provider.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{Instant, sleep};

/// Largest accepted jitter ratio; larger ratios are clamped to it.
pub const MAX_JITTER_RATIO: f64 = 1.0;

/// Stretch `base` by a random extra of up to `ratio × base`.
///
/// Zero or invalid ratios return `base` unchanged, and ratios above
/// [`MAX_JITTER_RATIO`] are clamped, so the result never exceeds twice
/// `base`.
#[must_use]
pub fn jittered(base: Duration, ratio: f64) -> Duration {
    if base.is_zero() || !ratio.is_finite() || ratio <= 0.0 {
        return base;
    }
    let factor = ratio.min(MAX_JITTER_RATIO) * rand::random::<f64>();
    Duration::try_from_secs_f64(base.as_secs_f64() * factor)
        .map_or(base, |extra| base.saturating_add(extra))
}

/// Single-permit gate enforcing a minimum gap between provider requests.
///
/// Callers hold the returned [`GatePermit`] for the duration of their
/// request, so at most one request is in flight and the next caller waits
/// until the gap since the previous admission has elapsed. The first
/// admission never waits.
#[derive(Debug)]
pub struct RateGate {
    spacing: Duration,
    jitter: f64,
    last_admission: Mutex<Option<Instant>>,
}

/// Proof of admission through a [`RateGate`]; dropping it lets the next
/// caller in.
#[derive(Debug)]
pub struct GatePermit<'gate> {
    _slot: MutexGuard<'gate, Option<Instant>>,
}

impl RateGate {
    /// Create a gate with the given minimum gap and jitter ratio.
    #[must_use]
    pub fn new(spacing: Duration, jitter: f64) -> Self {
        Self {
            spacing,
            jitter,
            last_admission: Mutex::new(None),
        }
    }

    /// Wait for the gap to elapse and take the permit.
    pub async fn admit(&self) -> GatePermit<'_> {
        let mut slot = self.last_admission.lock().await;
        if let Some(previous) = *slot {
            let gap = jittered(self.spacing, self.jitter);
            let remaining = gap.saturating_sub(previous.elapsed());
            if !remaining.is_zero() {
                sleep(remaining).await;
            }
        }
        *slot = Some(Instant::now());
        GatePermit { _slot: slot }
    }
}
