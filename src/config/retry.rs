use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Basic retry policy template
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (including the first one)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Random extra delay as a fraction of the base delay (0.0 disables jitter)
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

impl BackoffPolicy {
    pub fn validate(
        &self,
        name: &str,
    ) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig(format!("retry.{name}.max_retries must be at least 1")));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "retry.{name}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "retry.{name}.jitter {} must be a non-negative number",
                self.jitter
            )));
        }
        Ok(())
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Divide strategies by write path
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryPolicies {
    /// Read-mutate-write loops on rendered artifacts, finalizer patches and status
    #[serde(default)]
    pub conflict: BackoffPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            conflict: BackoffPolicy {
                max_retries: 5,
                base_delay_ms: 100,
                max_delay_ms: 100,
                jitter: 1.0,
            },
        }
    }
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.conflict.validate("conflict")
    }
}

fn default_max_retries() -> usize {
    5
}
fn default_base_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    100
}
fn default_jitter() -> f64 {
    1.0
}
