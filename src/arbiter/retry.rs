//! Attempt budget and back-off for arbitration rounds.

use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(800);

/// How many times a turn is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per turn, including the first
    max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `n * base_delay`
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Is another attempt allowed after `attempt` (1-based) failed?
    #[inline]
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait before the attempt following `attempt`. Saturates at `Duration::MAX`.
    #[inline]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let p = RetryPolicy::default();
        assert!(p.can_retry(1));
        assert!(p.can_retry(2));
        assert!(!p.can_retry(3));
        assert_eq!(p.delay_after(1), Duration::from_millis(800));
        assert_eq!(p.delay_after(2), Duration::from_millis(1600));
    }

    #[test]
    fn test_huge_base_delay_saturates() {
        let p = RetryPolicy::new(3, Duration::from_millis(u64::MAX));
        assert_eq!(p.delay_after(1), Duration::from_millis(u64::MAX));
        assert_eq!(p.delay_after(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_at_least_one_attempt() {
        let p = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(p.max_attempts(), 1);
        assert!(!p.can_retry(1));
    }
}
