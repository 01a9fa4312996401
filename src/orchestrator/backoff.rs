use std::time::Duration;

use rand::Rng;

use crate::constants;

/// Exponential backoff with full jitter.
///
/// The delay before retry `n` (1-based) is drawn uniformly from
/// `0..=min(cap, base * 2^(n-1))`. Full jitter spreads a burst of
/// rate-limited workers instead of having them all come back at once.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(constants::DEFAULT_BACKOFF_BASE_MS),
            cap: Duration::from_millis(constants::DEFAULT_BACKOFF_CAP_MS),
        }
    }
}

impl BackoffPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Ceiling for the given retry, before jitter.
    pub fn ceiling(&self, retry: usize) -> Duration {
        let exp = retry.saturating_sub(1).min(32) as u32;
        let raw = self
            .base
            .as_millis()
            .saturating_mul(1u128 << exp)
            .min(self.cap.as_millis());
        Duration::from_millis(raw as u64)
    }

    /// Jittered delay for the given retry (1-based).
    pub fn delay(&self, retry: usize) -> Duration {
        let ceiling = self.ceiling(retry).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=ceiling))
    }
}
