//! Retry policy - attempt budget and delay between delivery attempts.
//!
//! # Delay schedule
//! After failed attempt `n` (1-based) the notifier sleeps
//! `base_delay * multiplier^(n-1)`. No sleep follows the last attempt.
//!
//! | policy              | attempts | sleeps       |
//! |---------------------|----------|--------------|
//! | `default()`         | 3        | 2s, 2s       |
//! | `fixed(1, _)`       | 1        | none         |
//! | `with_multiplier(2)`| 3        | 2s, 4s       |
//!
//! A delay that cannot be represented falls back to `base_delay`.

use std::time::Duration;

/// Retry policy for mail delivery.
///
/// The default is a fixed 2s pause between at most 3 attempts. A multiplier
/// above 1.0 turns it into exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Delay after the first failed attempt.
    pub base_delay: Duration,

    /// Growth factor applied per further failure.
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            multiplier: 1.0,
        }
    }

    /// Negative and non-finite multipliers are replaced by 1.0 (fixed delay).
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
            multiplier
        } else {
            1.0
        };
        self
    }

    /// Attempt budget, never below one.
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after `attempts` failed attempts (1-indexed):
    /// `base_delay * multiplier^(attempts - 1)`. A result that is not a valid
    /// duration (overflow, or a bad multiplier set on the field directly)
    /// falls back to `base_delay`.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let exponent = i32::try_from(attempts.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay_secs = base_secs * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(delay_secs).unwrap_or(self.base_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }
}
