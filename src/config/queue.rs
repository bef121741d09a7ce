use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Work queue rate limiting and retry ceiling
///
/// With the defaults a failing key is requeued after
/// 5ms, 10ms, 20ms, ... 41s, 82s (15 attempts), after which its backoff is
/// forgotten and it is rescheduled once per `cooldown_secs`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueueConfig {
    /// Per-item exponential backoff base (milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-item exponential backoff cap (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Consecutive failures tolerated before falling back to the cool-down
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before a key that exhausted its retries is tried again
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Overall token bucket refill rate shared by every key
    #[serde(default = "default_qps")]
    pub qps: f64,

    /// Overall token bucket size
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_retries: default_max_retries(),
            cooldown_secs: default_cooldown_secs(),
            qps: default_qps(),
            burst: default_burst(),
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(Error::InvalidConfig("queue.base_delay_ms must be positive".into()));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "queue.max_delay_ms ({}) must be >= queue.base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }

        if self.max_retries == 0 {
            return Err(Error::InvalidConfig("queue.max_retries must be at least 1".into()));
        }

        if !(self.qps.is_finite() && self.qps > 0.0) {
            return Err(Error::InvalidConfig(format!("queue.qps {} must be positive", self.qps)));
        }

        if self.burst == 0 {
            return Err(Error::InvalidConfig("queue.burst must be at least 1".into()));
        }

        Ok(())
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

fn default_base_delay_ms() -> u64 {
    5
}
fn default_max_delay_ms() -> u64 {
    1_000_000
}
fn default_max_retries() -> u32 {
    15
}
fn default_cooldown_secs() -> u64 {
    60
}
fn default_qps() -> f64 {
    10.0
}
fn default_burst() -> u32 {
    100
}
