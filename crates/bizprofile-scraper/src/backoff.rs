//! Randomized delays used between fetch attempts and before tier escalation.
//!
//! Delays are exponential in the attempt number with multiplicative jitter
//! in `[0.5, 1.5)` so concurrent scrapes against the same host spread out.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Upper bound on any single backoff sleep.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Delay before retry number `attempt` (0-based): `base_ms * 2^attempt`,
/// jittered and capped at 30 s. A zero base always yields zero.
#[must_use]
pub fn jittered_delay(base_ms: u64, attempt: u32) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let exp = base_ms.saturating_mul(1u64 << attempt.min(16));
    let jitter = 0.5 + rand::random::<f64>();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let ms = (exp as f64 * jitter) as u64;
    Duration::from_millis(ms.min(MAX_BACKOFF_MS))
}

/// A uniformly random duration within `range_ms`.
#[must_use]
pub fn random_between(range_ms: &RangeInclusive<u64>) -> Duration {
    let (lo, hi) = (*range_ms.start(), *range_ms.end());
    if hi <= lo {
        return Duration::from_millis(lo);
    }
    Duration::from_millis(rand::random_range(lo..=hi))
}

/// Sleep for `delay` unless it is zero.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
