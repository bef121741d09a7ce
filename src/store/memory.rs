//! In-process store used by local mode and by tests.
//!
//! Mirrors the behaviour of a real object store closely enough for the
//! reconciliation logic: resource versions with conflict detection,
//! generation bumps on spec changes, finalizer-gated deletion, merge patches
//! and per-kind watch feeds that replay the current state before `Synced`.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::apply_merge_patch;
use super::DeletedObject;
use super::StoreClient;
use super::WatchEvent;
use crate::api::ControllerConfig;
use crate::api::ImageConfigRequest;
use crate::api::Pool;
use crate::api::RenderedArtifact;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::Result;
use crate::StoreError;

struct Table<T: Resource> {
    objects: BTreeMap<String, T>,
    watchers: Vec<mpsc::UnboundedSender<WatchEvent<T>>>,
}

impl<T: Resource> Default for Table<T> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            watchers: Vec::new(),
        }
    }
}

impl<T: Resource> Table<T> {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WatchEvent<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        for obj in self.objects.values() {
            let _ = tx.send(WatchEvent::Added(obj.clone()));
        }
        let _ = tx.send(WatchEvent::Synced);
        self.watchers.push(tx);
        rx
    }

    fn broadcast(
        &mut self,
        event: WatchEvent<T>,
    ) {
        self.watchers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn not_found(key: &str) -> StoreError {
        StoreError::NotFound {
            kind: T::KIND,
            name: key.to_string(),
        }
    }

    fn get(
        &self,
        key: &str,
    ) -> std::result::Result<&T, StoreError> {
        self.objects.get(key).ok_or_else(|| Self::not_found(key))
    }

    /// Stores `obj` under a fresh resource version and notifies watchers
    fn put(
        &mut self,
        revision: &mut u64,
        mut obj: T,
    ) -> T {
        *revision += 1;
        let meta = obj.meta_mut();
        meta.resource_version = revision.to_string();
        if meta.uid.is_empty() {
            meta.uid = format!("{:032x}", rand::random::<u128>());
        }

        let key = obj.key();
        let event = match self.objects.insert(key, obj.clone()) {
            Some(old) => WatchEvent::Updated {
                old,
                new: obj.clone(),
            },
            None => WatchEvent::Added(obj.clone()),
        };
        self.broadcast(event);
        obj
    }

    fn remove(
        &mut self,
        key: &str,
    ) -> std::result::Result<T, StoreError> {
        let obj = self.objects.remove(key).ok_or_else(|| Self::not_found(key))?;
        self.broadcast(WatchEvent::Deleted(DeletedObject::Live(obj.clone())));
        Ok(obj)
    }
}

#[derive(Default)]
struct State {
    revision: u64,
    pools: Table<Pool>,
    requests: Table<RuntimeConfigRequest>,
    images: Table<ImageConfigRequest>,
    controller_configs: Table<ControllerConfig>,
    artifacts: Table<RenderedArtifact>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    artifact_writes: AtomicU64,
    request_writes: AtomicU64,
    injected_failures: AtomicU32,
    injected_conflicts: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -
    // Watch feeds

    pub fn watch_pools(&self) -> mpsc::UnboundedReceiver<WatchEvent<Pool>> {
        self.state.lock().pools.subscribe()
    }

    pub fn watch_runtime_configs(&self) -> mpsc::UnboundedReceiver<WatchEvent<RuntimeConfigRequest>> {
        self.state.lock().requests.subscribe()
    }

    pub fn watch_image_configs(&self) -> mpsc::UnboundedReceiver<WatchEvent<ImageConfigRequest>> {
        self.state.lock().images.subscribe()
    }

    pub fn watch_controller_configs(&self) -> mpsc::UnboundedReceiver<WatchEvent<ControllerConfig>> {
        self.state.lock().controller_configs.subscribe()
    }

    // -
    // User-facing writes

    pub fn apply_pool(
        &self,
        pool: Pool,
    ) -> Pool {
        let mut state = self.state.lock();
        let State { revision, pools, .. } = &mut *state;
        pools.put(revision, pool)
    }

    pub fn delete_pool(
        &self,
        name: &str,
    ) -> Result<()> {
        self.state.lock().pools.remove(name)?;
        Ok(())
    }

    /// Creates or updates a request's user-owned fields
    ///
    /// System-owned fields (uid, status, finalizers, deletion marker) of an
    /// existing request are preserved; the generation moves when the spec
    /// changes.
    pub fn apply_runtime_config(
        &self,
        mut request: RuntimeConfigRequest,
    ) -> RuntimeConfigRequest {
        let mut state = self.state.lock();
        let State { revision, requests, .. } = &mut *state;

        match requests.objects.get(&request.key()) {
            Some(existing) => {
                let generation = existing.metadata.generation;
                let spec_changed = existing.spec != request.spec;
                request.metadata.uid = existing.metadata.uid.clone();
                request.metadata.finalizers = existing.metadata.finalizers.clone();
                request.metadata.deletion_timestamp = existing.metadata.deletion_timestamp;
                request.status = existing.status.clone();
                request.metadata.generation = if spec_changed { generation + 1 } else { generation };
            }
            None => {
                if request.metadata.generation == 0 {
                    request.metadata.generation = 1;
                }
            }
        }
        requests.put(revision, request)
    }

    /// Deletes a request, or marks it for deletion while finalizers remain
    pub fn delete_runtime_config(
        &self,
        key: &str,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let State { revision, requests, .. } = &mut *state;

        let existing = requests.get(key)?.clone();
        if existing.metadata.finalizers.is_empty() {
            requests.remove(key)?;
        } else if existing.metadata.deletion_timestamp.is_none() {
            let mut marked = existing;
            marked.metadata.deletion_timestamp = Some(Utc::now());
            requests.put(revision, marked);
        }
        Ok(())
    }

    pub fn apply_image_config(
        &self,
        image: ImageConfigRequest,
    ) -> ImageConfigRequest {
        let mut state = self.state.lock();
        let State { revision, images, .. } = &mut *state;
        images.put(revision, image)
    }

    pub fn delete_image_config(
        &self,
        name: &str,
    ) -> Result<()> {
        self.state.lock().images.remove(name)?;
        Ok(())
    }

    pub fn apply_controller_config(
        &self,
        config: ControllerConfig,
    ) -> ControllerConfig {
        let mut state = self.state.lock();
        let State {
            revision,
            controller_configs,
            ..
        } = &mut *state;
        controller_configs.put(revision, config)
    }

    // -
    // Inspection

    pub fn artifact(
        &self,
        name: &str,
    ) -> Option<RenderedArtifact> {
        self.state.lock().artifacts.objects.get(name).cloned()
    }

    pub fn artifacts(&self) -> Vec<RenderedArtifact> {
        self.state.lock().artifacts.objects.values().cloned().collect()
    }

    pub fn runtime_config(
        &self,
        key: &str,
    ) -> Option<RuntimeConfigRequest> {
        self.state.lock().requests.objects.get(key).cloned()
    }

    /// Number of successful artifact creates and updates so far
    pub fn artifact_writes(&self) -> u64 {
        self.artifact_writes.load(Ordering::Acquire)
    }

    /// Number of successful request patches and status updates so far
    pub fn request_writes(&self) -> u64 {
        self.request_writes.load(Ordering::Acquire)
    }

    // -
    // Fault injection

    /// Makes the next `n` artifact writes fail with a transport error
    pub fn fail_next_artifact_writes(
        &self,
        n: u32,
    ) {
        self.injected_failures.store(n, Ordering::Release);
    }

    /// Makes the next `n` artifact updates fail with a conflict
    pub fn conflict_next_artifact_updates(
        &self,
        n: u32,
    ) {
        self.injected_conflicts.store(n, Ordering::Release);
    }

    fn take_injected(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get_artifact(
        &self,
        name: &str,
    ) -> Result<RenderedArtifact> {
        Ok(self.state.lock().artifacts.get(name)?.clone())
    }

    async fn create_artifact(
        &self,
        artifact: &RenderedArtifact,
    ) -> Result<RenderedArtifact> {
        if artifact.metadata.name.is_empty() {
            return Err(StoreError::Invalid {
                kind: RenderedArtifact::KIND,
                reason: "name is required".to_string(),
            }
            .into());
        }
        if Self::take_injected(&self.injected_failures) {
            return Err(StoreError::Transport("injected write failure".to_string()).into());
        }

        let mut state = self.state.lock();
        let State {
            revision, artifacts, ..
        } = &mut *state;
        if artifacts.objects.contains_key(&artifact.metadata.name) {
            return Err(StoreError::AlreadyExists {
                kind: RenderedArtifact::KIND,
                name: artifact.metadata.name.clone(),
            }
            .into());
        }

        let mut created = artifact.clone();
        created.metadata.generation = 1;
        let created = artifacts.put(revision, created);
        self.artifact_writes.fetch_add(1, Ordering::AcqRel);
        debug!(name = %created.metadata.name, rv = %created.metadata.resource_version, "artifact created");
        Ok(created)
    }

    async fn update_artifact(
        &self,
        artifact: &RenderedArtifact,
    ) -> Result<RenderedArtifact> {
        if Self::take_injected(&self.injected_failures) {
            return Err(StoreError::Transport("injected write failure".to_string()).into());
        }
        let name = artifact.metadata.name.clone();
        if Self::take_injected(&self.injected_conflicts) {
            return Err(StoreError::Conflict {
                kind: RenderedArtifact::KIND,
                name,
            }
            .into());
        }

        let mut state = self.state.lock();
        let State {
            revision, artifacts, ..
        } = &mut *state;
        let existing = artifacts.get(&name)?;
        let rv = &artifact.metadata.resource_version;
        if !rv.is_empty() && *rv != existing.metadata.resource_version {
            return Err(StoreError::Conflict {
                kind: RenderedArtifact::KIND,
                name,
            }
            .into());
        }

        let mut updated = artifact.clone();
        updated.metadata.uid = existing.metadata.uid.clone();
        updated.metadata.generation = if existing.spec != artifact.spec {
            existing.metadata.generation + 1
        } else {
            existing.metadata.generation
        };
        let updated = artifacts.put(revision, updated);
        self.artifact_writes.fetch_add(1, Ordering::AcqRel);
        debug!(name = %updated.metadata.name, rv = %updated.metadata.resource_version, "artifact updated");
        Ok(updated)
    }

    async fn delete_artifact(
        &self,
        name: &str,
    ) -> Result<()> {
        self.state.lock().artifacts.remove(name)?;
        debug!(%name, "artifact deleted");
        Ok(())
    }

    async fn get_runtime_config(
        &self,
        key: &str,
    ) -> Result<RuntimeConfigRequest> {
        Ok(self.state.lock().requests.get(key)?.clone())
    }

    async fn patch_runtime_config(
        &self,
        key: &str,
        patch: &Value,
    ) -> Result<RuntimeConfigRequest> {
        let invalid = |e: serde_json::Error| StoreError::Invalid {
            kind: RuntimeConfigRequest::KIND,
            reason: e.to_string(),
        };

        let mut state = self.state.lock();
        let State { revision, requests, .. } = &mut *state;
        let existing = requests.get(key)?.clone();

        let mut doc = serde_json::to_value(&existing).map_err(invalid)?;
        apply_merge_patch(&mut doc, patch);
        let mut patched: RuntimeConfigRequest = serde_json::from_value(doc).map_err(invalid)?;

        patched.metadata.name = existing.metadata.name.clone();
        patched.metadata.namespace = existing.metadata.namespace.clone();
        patched.metadata.uid = existing.metadata.uid.clone();
        patched.metadata.deletion_timestamp = existing.metadata.deletion_timestamp;
        patched.metadata.generation = if patched.spec != existing.spec {
            existing.metadata.generation + 1
        } else {
            existing.metadata.generation
        };

        let patched = requests.put(revision, patched);
        self.request_writes.fetch_add(1, Ordering::AcqRel);

        if patched.metadata.is_deleting() && patched.metadata.finalizers.is_empty() {
            requests.remove(key)?;
            debug!(%key, "last finalizer removed, request deleted");
        }
        Ok(patched)
    }

    async fn update_runtime_config_status(
        &self,
        request: &RuntimeConfigRequest,
    ) -> Result<RuntimeConfigRequest> {
        let key = request.key();
        let mut state = self.state.lock();
        let State { revision, requests, .. } = &mut *state;
        let existing = requests.get(&key)?;

        let rv = &request.metadata.resource_version;
        if !rv.is_empty() && *rv != existing.metadata.resource_version {
            return Err(StoreError::Conflict {
                kind: RuntimeConfigRequest::KIND,
                name: key,
            }
            .into());
        }

        let mut updated = existing.clone();
        updated.status = request.status.clone();
        let updated = requests.put(revision, updated);
        self.request_writes.fetch_add(1, Ordering::AcqRel);
        Ok(updated)
    }
}
