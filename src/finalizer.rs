//! Finalizer bookkeeping on runtime config requests.
//!
//! Each finalizer names one rendered artifact created on the request's behalf.
//! Deleting a request drains the list one entry per invocation: the artifact
//! named by the first finalizer is deleted, then that entry is removed through
//! a merge patch. The store deletes the request once the list is empty.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::config::BackoffPolicy;
use crate::store::create_merge_patch;
use crate::store::is_empty_patch;
use crate::store::StoreClient;
use crate::utils::retry_on_conflict;
use crate::Result;
use crate::StoreError;

pub struct FinalizerManager {
    store: Arc<dyn StoreClient>,
    policy: BackoffPolicy,
}

impl FinalizerManager {
    pub fn new(
        store: Arc<dyn StoreClient>,
        policy: BackoffPolicy,
    ) -> Self {
        Self { store, policy }
    }

    /// Deletes the artifact named by the first finalizer and drops that entry
    ///
    /// No-op when the request has no finalizers. An artifact or request that is
    /// already gone counts as cleaned up.
    pub async fn cascade_delete(
        &self,
        request: &RuntimeConfigRequest,
    ) -> Result<()> {
        let Some(artifact) = request.metadata.finalizers.first() else {
            return Ok(());
        };

        match self.store.delete_artifact(artifact).await {
            Ok(()) => info!(request = %request.key(), %artifact, "deleted rendered artifact"),
            Err(e) if e.is_not_found() => debug!(request = %request.key(), %artifact, "artifact already gone"),
            Err(e) => return Err(e),
        }

        let mut desired = request.clone();
        desired.metadata.finalizers.remove(0);
        match self.patch(request, &desired).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Appends `artifact` to the request's finalizers unless already present
    ///
    /// On success `request` carries the finalizers and resource version the
    /// store returned.
    pub async fn add_finalizer(
        &self,
        request: &mut RuntimeConfigRequest,
        artifact: &str,
    ) -> Result<()> {
        if request.metadata.finalizers.iter().any(|f| f == artifact) {
            return Ok(());
        }

        let mut desired = request.clone();
        desired.metadata.finalizers.push(artifact.to_string());
        if let Some(patched) = self.patch(request, &desired).await? {
            request.metadata.finalizers = patched.metadata.finalizers;
            request.metadata.resource_version = patched.metadata.resource_version;
        }
        Ok(())
    }

    async fn patch(
        &self,
        current: &RuntimeConfigRequest,
        desired: &RuntimeConfigRequest,
    ) -> Result<Option<RuntimeConfigRequest>> {
        let patch = finalizer_patch(current, desired)?;
        if is_empty_patch(&patch) {
            return Ok(None);
        }

        let key = current.key();
        let (store, key, patch) = (&self.store, key.as_str(), &patch);
        let patched = retry_on_conflict(&self.policy, || async move { store.patch_runtime_config(key, patch).await }).await?;
        debug!(request = %key, finalizers = ?patched.metadata.finalizers, "patched finalizers");
        Ok(Some(patched))
    }
}

/// Merge patch carrying only the difference between `current` and `desired`
pub(crate) fn finalizer_patch(
    current: &RuntimeConfigRequest,
    desired: &RuntimeConfigRequest,
) -> Result<Value> {
    let to_value = |r: &RuntimeConfigRequest| {
        serde_json::to_value(r).map_err(|e| StoreError::Invalid {
            kind: RuntimeConfigRequest::KIND,
            reason: e.to_string(),
        })
    };
    Ok(create_merge_patch(&to_value(current)?, &to_value(desired)?))
}
