use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONTROLLER_VERSION;
use crate::Error;
use crate::Result;

/// Reconciliation loop parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControllerOptions {
    /// Concurrent workers draining the runtime config request queue.
    /// The image config queue always runs exactly one worker.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Root directory of the per-pool baseline templates
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Template directory used for pools without their own
    #[serde(default = "default_fallback_role")]
    pub fallback_role: String,

    /// Interval at which every cached object is re-enqueued (0 disables resync)
    #[serde(default = "default_resync_period_secs")]
    pub resync_period_secs: u64,

    /// Version stamped on rendered artifacts. Empty means the crate version.
    #[serde(default)]
    pub controller_version: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            templates_dir: default_templates_dir(),
            fallback_role: default_fallback_role(),
            resync_period_secs: default_resync_period_secs(),
            controller_version: String::new(),
        }
    }
}

impl ControllerOptions {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("controller.workers must be at least 1".into()));
        }

        if self.templates_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("controller.templates_dir cannot be empty".into()));
        }

        if self.fallback_role.trim().is_empty() {
            return Err(Error::InvalidConfig("controller.fallback_role cannot be empty".into()));
        }

        Ok(())
    }

    /// Version string written into the generated-by annotation
    pub fn effective_version(&self) -> String {
        if self.controller_version.trim().is_empty() {
            CONTROLLER_VERSION.to_string()
        } else {
            self.controller_version.trim().to_string()
        }
    }
}

fn default_workers() -> usize {
    5
}
fn default_templates_dir() -> PathBuf {
    PathBuf::from("/etc/ctrcfg/templates")
}
fn default_fallback_role() -> String {
    "worker".to_string()
}
fn default_resync_period_secs() -> u64 {
    600
}
