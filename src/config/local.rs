use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Local mode: the binary reconciles against an in-memory store seeded from a
/// JSON manifest instead of a remote cluster.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LocalConfig {
    /// Path of the seed manifest (pools, requests, image config, controller config)
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}
