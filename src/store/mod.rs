//! Access to cluster objects: the write path ([`StoreClient`]), the read
//! caches ([`Lister`]) and the watch feeds that keep the caches current.
mod cache;
mod manifest;
mod memory;
mod patch;
mod watch;

pub use cache::*;
pub use manifest::*;
pub use memory::*;
pub use patch::*;
pub use watch::*;

#[cfg(test)]
mod manifest_test;

#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use async_trait::async_trait;

use crate::api::RenderedArtifact;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::Result;

/// Write-capable client against the backing store
///
/// Updates carry the resource version they were computed from and fail with
/// a conflict when the stored object moved on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    async fn get_artifact(
        &self,
        name: &str,
    ) -> Result<RenderedArtifact>;

    async fn create_artifact(
        &self,
        artifact: &RenderedArtifact,
    ) -> Result<RenderedArtifact>;

    async fn update_artifact(
        &self,
        artifact: &RenderedArtifact,
    ) -> Result<RenderedArtifact>;

    async fn delete_artifact(
        &self,
        name: &str,
    ) -> Result<()>;

    async fn get_runtime_config(
        &self,
        key: &str,
    ) -> Result<RuntimeConfigRequest>;

    /// Applies a JSON merge patch and returns the patched object
    async fn patch_runtime_config(
        &self,
        key: &str,
        patch: &Value,
    ) -> Result<RuntimeConfigRequest>;

    /// Replaces only the status of the stored request
    async fn update_runtime_config_status(
        &self,
        request: &RuntimeConfigRequest,
    ) -> Result<RuntimeConfigRequest>;
}

/// Read-only view over a locally cached set of objects
///
/// Returned objects are copies; callers are free to mutate them.
#[cfg_attr(test, automock)]
pub trait Lister<T: Resource>: Send + Sync + 'static {
    fn get(
        &self,
        key: &str,
    ) -> Option<T>;

    /// Every cached object, sorted by key
    fn list(&self) -> Vec<T>;
}
