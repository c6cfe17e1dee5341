//! Backoff schedules for bounded polling loops.

use std::time::Duration;

/// Schedule for retrying an operation a bounded number of times.
///
/// `max_attempts` counts every attempt, including the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry in seconds.
    pub base_delay_secs: u64,
    /// Whether to double the delay on each retry.
    pub exponential_backoff: bool,
    /// Maximum delay between attempts in seconds.
    pub max_delay_secs: u64,
}

impl RetryStrategy {
    /// Creates an exponential schedule starting at one second.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_secs: 1,
            exponential_backoff: true,
            max_delay_secs: 60,
        }
    }

    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0,
            exponential_backoff: false,
            max_delay_secs: 0,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay_secs
                .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
        } else {
            self.base_delay_secs
        };

        Duration::from_secs(delay.min(self.max_delay_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::new(4);

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_max_delay_cap() {
        let strategy = RetryStrategy {
            base_delay_secs: 10,
            ..RetryStrategy::new(10)
        };

        assert_eq!(strategy.delay_for_attempt(5), Duration::from_secs(60));
    }

    #[test]
    fn test_linear_and_no_retry() {
        let linear = RetryStrategy {
            exponential_backoff: false,
            ..RetryStrategy::new(3)
        };
        assert_eq!(linear.delay_for_attempt(3), Duration::from_secs(1));

        let none = RetryStrategy::no_retry();
        assert_eq!(none.max_attempts, 1);
        assert_eq!(none.delay_for_attempt(1), Duration::ZERO);
    }
}
