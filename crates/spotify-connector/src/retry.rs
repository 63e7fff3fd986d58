//! Retry policy and upstream status classification

use std::time::Duration;

/// Default attempt budget per logical request.
pub const MAX_REQUEST_ATTEMPTS: u32 = 6;

/// Default base backoff delay.
pub const DELAY_BASE: Duration = Duration::from_secs(2);

/// Attempts before retry logging escalates from info to warn.
pub const QUIET_ATTEMPTS: u32 = 3;

/// What the executor does with an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// 429 and gateway errors: back off and retry.
    Transient,
    /// 401: the bearer token was rejected, re-authenticate and retry.
    Unauthorized,
    /// Anything else: fail immediately.
    Fatal,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 | 502 | 503 | 504 => StatusClass::Transient,
        401 => StatusClass::Unauthorized,
        _ => StatusClass::Fatal,
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before the `step`-th backoff retry (1-based): `base * 2^(step-1)`.
    pub fn delay_for(&self, step: u32) -> Duration {
        let exponent = step.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_REQUEST_ATTEMPTS, DELAY_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_transient_statuses() {
        for status in [429, 502, 503, 504] {
            assert_eq!(classify_status(status), StatusClass::Transient, "{status}");
        }
    }

    #[test]
    fn classify_unauthorized() {
        assert_eq!(classify_status(401), StatusClass::Unauthorized);
    }

    #[test]
    fn classify_fatal_statuses() {
        for status in [400, 403, 404, 409, 500, 501] {
            assert_eq!(classify_status(status), StatusClass::Fatal, "{status}");
        }
    }

    #[test]
    fn classify_success_range() {
        assert_eq!(classify_status(200), StatusClass::Success);
        assert_eq!(classify_status(204), StatusClass::Success);
    }

    #[test]
    fn default_backoff_doubles_from_two_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 6);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4), Duration::from_secs(16));
        assert_eq!(policy.delay_for(5), Duration::from_secs(32));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, DELAY_BASE).max_attempts, 1);
    }

    #[test]
    fn huge_steps_saturate() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(100) >= policy.delay_for(31));
    }
}
