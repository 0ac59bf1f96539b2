use std::time::Duration;

use crate::Generation;

/// Work the state machine asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop any pending timer and abort in-flight requests of older generations.
    CancelPending,
    /// Send the stored request to the submit endpoint.
    Submit { generation: Generation },
    /// Wait `delay`, then GET the poll URL.
    SchedulePoll {
        generation: Generation,
        url: String,
        delay: Delay,
    },
    /// GET the result URL once.
    FetchResult { generation: Generation, url: String },
}

/// A wait before the next request; the runtime supplies the random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    pub base: Duration,
    pub max_jitter: Duration,
    pub cap: Duration,
}

impl Delay {
    pub fn fixed(duration: Duration) -> Self {
        Self {
            base: duration,
            max_jitter: Duration::ZERO,
            cap: duration,
        }
    }

    pub fn immediate() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Concrete wait for a sampled jitter value.
    pub fn resolve(&self, jitter: Duration) -> Duration {
        (self.base + jitter.min(self.max_jitter)).min(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_bounded_and_capped() {
        let delay = Delay {
            base: Duration::from_secs(9),
            max_jitter: Duration::from_secs(1),
            cap: Duration::from_secs(10),
        };
        assert_eq!(delay.resolve(Duration::ZERO), Duration::from_secs(9));
        assert_eq!(
            delay.resolve(Duration::from_millis(500)),
            Duration::from_millis(9_500)
        );
        assert_eq!(delay.resolve(Duration::from_secs(5)), Duration::from_secs(10));
    }

    #[test]
    fn fixed_delay_ignores_jitter() {
        let delay = Delay::fixed(Duration::from_secs(4));
        assert_eq!(delay.resolve(Duration::from_secs(3)), Duration::from_secs(4));
    }
}
