//! Configuration management for the runtime config controller.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`CTRCFG__SECTION__KEY`)
//! - Component-wise validation
mod controller;
mod local;
mod logging;
mod monitoring;
mod queue;
mod retry;
pub use controller::*;
pub use local::*;
pub use logging::*;
pub use monitoring::*;
pub use queue::*;
pub use retry::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable prefix for every override
pub const ENV_PREFIX: &str = "CTRCFG";

/// Top-level settings container
///
/// Sources are merged with later ones taking priority:
/// 1. Type defaults
/// 2. Configuration file named by `CONFIG_PATH`
/// 3. Environment variables prefixed with `CTRCFG__`
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ControllerSettings {
    /// Worker counts, templates and resync behaviour
    #[serde(default)]
    pub controller: ControllerOptions,
    /// Work queue backoff and retry ceiling
    #[serde(default)]
    pub queue: QueueConfig,
    /// Optimistic concurrency retry policies
    #[serde(default)]
    pub retry: RetryPolicies,
    /// Metrics exporter
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Tracing subscriber setup
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Local mode seed data
    #[serde(default)]
    pub local: LocalConfig,
}

impl Debug for ControllerSettings {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ControllerSettings")
            .field("controller", &self.controller)
            .field("queue", &self.queue)
            .finish()
    }
}

impl ControllerSettings {
    /// Loads settings from hierarchical sources without validation.
    ///
    /// Callers must run [`ControllerSettings::validate`] after all overrides.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/controller.toml");
    /// std::env::set_var("CTRCFG__CONTROLLER__WORKERS", "8");
    /// let settings = ControllerSettings::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Applies additional overrides from a file, then the environment again.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validates every section and returns the validated settings.
    pub fn validate(self) -> Result<Self> {
        self.controller.validate()?;
        self.queue.validate()?;
        self.retry.validate()?;
        self.monitoring.validate()?;
        self.logging.validate()?;
        Ok(self)
    }
}
