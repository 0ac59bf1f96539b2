use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Delay;

/// Timing and bounds of the polling loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Delay before the first poll after a job is accepted.
    pub first_poll_delay: Duration,
    pub base_interval: Duration,
    /// Growth of the interval factor per non-terminal response.
    pub backoff_step: f64,
    pub max_backoff_factor: f64,
    pub max_jitter: Duration,
    pub max_interval: Duration,
    /// Non-terminal responses tolerated before the job is declared timed out.
    pub max_attempts: u32,
    /// Consecutive network failures retried before giving up.
    pub max_network_retries: u32,
    pub retry_base: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            first_poll_delay: Duration::ZERO,
            base_interval: Duration::from_secs(2),
            backoff_step: 0.05,
            max_backoff_factor: 1.5,
            max_jitter: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            max_attempts: 100,
            max_network_retries: 5,
            retry_base: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    pub fn first_poll(&self) -> Delay {
        Delay::fixed(self.first_poll_delay)
    }

    /// Delay after `attempts` non-terminal responses.
    pub fn poll_delay(&self, attempts: u32) -> Delay {
        let factor = (1.0 + self.backoff_step * f64::from(attempts))
            .clamp(1.0, self.max_backoff_factor.max(1.0));
        let millis = (self.base_interval.as_millis() as f64 * factor).round() as u64;
        Delay {
            base: Duration::from_millis(millis).min(self.max_interval),
            max_jitter: self.max_jitter,
            cap: self.max_interval,
        }
    }

    /// Delay before the `retry`-th (1-based) repeat of a failed poll.
    pub fn retry_delay(&self, retry: u32) -> Delay {
        let exponent = retry.saturating_sub(1).min(16);
        Delay::fixed(self.retry_base.saturating_mul(1 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_grows_mildly_and_caps_at_one_and_a_half() {
        let policy = PollPolicy::default();
        assert_eq!(policy.poll_delay(0).base, Duration::from_secs(2));
        assert_eq!(policy.poll_delay(4).base, Duration::from_millis(2_400));
        assert_eq!(policy.poll_delay(10).base, Duration::from_secs(3));
        assert_eq!(policy.poll_delay(99).base, Duration::from_secs(3));
        assert_eq!(policy.poll_delay(3).max_jitter, Duration::from_secs(1));
        assert_eq!(policy.poll_delay(3).cap, Duration::from_secs(10));
    }

    #[test]
    fn retry_delays_double_from_two_seconds() {
        let policy = PollPolicy::default();
        let delays: Vec<_> = (1..=5).map(|n| policy.retry_delay(n).base).collect();
        assert_eq!(
            delays,
            [2, 4, 8, 16, 32].map(Duration::from_secs).to_vec()
        );
    }

    #[test]
    fn long_base_interval_is_capped() {
        let policy = PollPolicy {
            base_interval: Duration::from_secs(9),
            ..PollPolicy::default()
        };
        let delay = policy.poll_delay(20);
        assert_eq!(delay.base, Duration::from_secs(10));
        assert_eq!(delay.resolve(Duration::from_secs(1)), Duration::from_secs(10));
    }
}
