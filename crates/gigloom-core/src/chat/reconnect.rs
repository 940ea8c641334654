//! Bounded linear backoff for the chat transport.
//!
//! `ReconnectPolicy` is the static configuration; `ReconnectTracker` counts
//! consecutive failed handshakes and decides, on every close, whether to
//! schedule another attempt. A successful handshake resets the counter.

use std::time::Duration;

use gigloom_types::config::ReconnectConfig;

/// Static reconnection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay before the `attempt`-th retry (1-based): `base_delay * attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(2000))
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }
}

/// What to do after the connection closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait `delay`, then perform retry number `attempt`.
    Retry { attempt: u32, delay: Duration },
    /// The budget is spent; stay closed.
    GiveUp { attempts: u32 },
}

/// Tracks consecutive reconnection attempts for one session.
#[derive(Debug, Clone)]
pub struct ReconnectTracker {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectTracker {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Retries performed since the last successful handshake.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a successful handshake.
    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    /// Record a closed connection (or a failed handshake).
    pub fn on_close(&mut self) -> ReconnectDecision {
        if self.attempts >= self.policy.max_attempts {
            return ReconnectDecision::GiveUp {
                attempts: self.attempts,
            };
        }
        self.attempts += 1;
        ReconnectDecision::Retry {
            attempt: self.attempts,
            delay: self.policy.delay_for(self.attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry_delay(decision: ReconnectDecision) -> Duration {
        match decision {
            ReconnectDecision::Retry { delay, .. } => delay,
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(10_000));
    }

    #[test]
    fn test_linear_backoff_then_give_up() {
        let mut tracker = ReconnectTracker::new(ReconnectPolicy::default());
        let delays: Vec<u128> = (0..5)
            .map(|_| retry_delay(tracker.on_close()).as_millis())
            .collect();
        assert_eq!(delays, vec![2000, 4000, 6000, 8000, 10_000]);

        assert_eq!(tracker.on_close(), ReconnectDecision::GiveUp { attempts: 5 });
        // Stays exhausted.
        assert_eq!(tracker.on_close(), ReconnectDecision::GiveUp { attempts: 5 });
    }

    #[test]
    fn test_open_resets_counter() {
        let mut tracker = ReconnectTracker::new(ReconnectPolicy::default());
        tracker.on_close();
        tracker.on_close();
        assert_eq!(tracker.attempts(), 2);

        tracker.on_open();
        assert_eq!(
            tracker.on_close(),
            ReconnectDecision::Retry {
                attempt: 1,
                delay: Duration::from_millis(2000)
            }
        );
    }

    #[test]
    fn test_zero_attempts_never_retries() {
        let mut tracker = ReconnectTracker::new(ReconnectPolicy::new(0, Duration::from_secs(1)));
        assert_eq!(tracker.on_close(), ReconnectDecision::GiveUp { attempts: 0 });
    }

    #[test]
    fn test_policy_from_config() {
        let config = ReconnectConfig {
            max_attempts: 3,
            base_delay_ms: 500,
        };
        let policy = ReconnectPolicy::from(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
    }
}
