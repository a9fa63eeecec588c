//! Retry policy and backoff calculation.
//!
//! Provides the types and math for retry logic. The async retry executor
//! lives in `modelgate-catalog` (which owns the fetch error taxonomy), while
//! this module contains the portable, sync-only building blocks:
//!
//! - [`RetryPolicy`]: Attempt budget and exponential backoff parameters
//! - [`RetryPolicy::backoff_delay`]: Delay between attempt *k* and *k+1*

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum attempts (including the first one).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default backoff multiplier.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Bounded retry with exponential backoff.
///
/// An operation runs at most `max_attempts` times. Between attempt *k* and
/// *k+1* the executor waits `base_delay_ms × backoff_multiplier^(k-1)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum number of attempts, at least 1 (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in ms, greater than 0 (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Growth factor applied per retry, at least 1.0 (default: 2.0).
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Create a policy, checking its invariants.
    pub fn new(
        max_attempts: u32,
        base_delay_ms: u64,
        backoff_multiplier: f64,
    ) -> Result<Self, ValidationError> {
        let policy = Self {
            max_attempts,
            base_delay_ms,
            backoff_multiplier,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Policy that runs the operation exactly once.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Check `max_attempts ≥ 1`, `base_delay_ms > 0` and `backoff_multiplier ≥ 1`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts < 1 {
            return Err(ValidationError::new(
                "retry.maxAttempts",
                "integer >= 1",
                self.max_attempts,
            ));
        }
        if self.base_delay_ms == 0 {
            return Err(ValidationError::new(
                "retry.baseDelayMs",
                "integer > 0",
                self.base_delay_ms,
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ValidationError::new(
                "retry.backoffMultiplier",
                "number >= 1",
                self.backoff_multiplier,
            ));
        }
        Ok(())
    }

    /// Delay to wait after the failed attempt `attempt` (1-based).
    ///
    /// Formula: `base_delay_ms × backoff_multiplier^(attempt-1)`, saturating
    /// at `u64::MAX` milliseconds.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff_multiplier.powi(exponent);
        let millis = (self.base_delay_ms as f64) * factor;
        let millis = if millis.is_finite() && millis < u64::MAX as f64 {
            millis.round() as u64
        } else {
            u64::MAX
        };
        Duration::from_millis(millis)
    }

    /// The full backoff schedule: one delay per retry, `max_attempts - 1` entries.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|k| self.backoff_delay(k)).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- RetryPolicy --

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 1000);
        assert!((policy.backoff_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn retry_policy_serde_defaults() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn retry_policy_serde_camel_case() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"maxAttempts":5,"baseDelayMs":250,"backoffMultiplier":1.5}"#)
                .unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_ms, 250);
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = RetryPolicy::new(0, 1000, 2.0).unwrap_err();
        assert_eq!(err.path, "retry.maxAttempts");
    }

    #[test]
    fn zero_base_delay_rejected() {
        assert_matches!(
            RetryPolicy::new(3, 0, 2.0),
            Err(ValidationError { ref path, .. }) if path == "retry.baseDelayMs"
        );
    }

    #[test]
    fn multiplier_below_one_rejected() {
        assert!(RetryPolicy::new(3, 1000, 0.5).is_err());
        assert!(RetryPolicy::new(3, 1000, f64::NAN).is_err());
        assert!(RetryPolicy::new(3, 1000, 1.0).is_ok());
    }

    // -- backoff_delay --

    #[test]
    fn backoff_exponential_growth() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(8000));
    }

    #[test]
    fn backoff_constant_with_unit_multiplier() {
        let policy = RetryPolicy::new(4, 500, 1.0).unwrap();
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_millis(500); 3]
        );
    }

    #[test]
    fn backoff_fractional_multiplier_rounds() {
        let policy = RetryPolicy::new(3, 1000, 1.5).unwrap();
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(1500));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(2250));
    }

    #[test]
    fn backoff_high_attempt_saturates() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(5000), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn schedule_has_one_entry_per_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
        assert!(RetryPolicy::single_attempt().schedule().is_empty());
    }
}
