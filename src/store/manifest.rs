use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use super::MemoryStore;
use crate::api::ControllerConfig;
use crate::api::ImageConfigRequest;
use crate::api::Pool;
use crate::api::RuntimeConfigRequest;
use crate::Error;
use crate::Result;

/// Initial contents of a [`MemoryStore`], read from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifest {
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub runtime_configs: Vec<RuntimeConfigRequest>,
    #[serde(default)]
    pub image: Option<ImageConfigRequest>,
    #[serde(default)]
    pub controller_config: Option<ControllerConfig>,
}

impl ClusterManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("could not read manifest {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidConfig(format!("could not parse manifest {}: {}", path.display(), e)))
    }
}

impl MemoryStore {
    /// Store pre-populated with every object of `manifest`
    pub fn from_manifest(manifest: ClusterManifest) -> Self {
        info!(
            pools = manifest.pools.len(),
            runtime_configs = manifest.runtime_configs.len(),
            image = manifest.image.is_some(),
            "seeding in-memory store"
        );
        let store = Self::new();
        if let Some(config) = manifest.controller_config {
            store.apply_controller_config(config);
        }
        for pool in manifest.pools {
            store.apply_pool(pool);
        }
        if let Some(image) = manifest.image {
            store.apply_image_config(image);
        }
        for request in manifest.runtime_configs {
            store.apply_runtime_config(request);
        }
        store
    }
}
