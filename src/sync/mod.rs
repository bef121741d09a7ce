//! Reconciliation of runtime config requests and the image config singleton
//! into per-pool rendered artifacts.
//!
//! Each handler converges one object per invocation and is safe to run again
//! for the same key at any time: everything it writes is derived from the
//! latest cached snapshot and written through version-checked updates.
mod artifact;
mod image;
mod runtime;
mod status;

pub use artifact::image_artifact_name;
pub use artifact::owner_reference;
pub use artifact::request_artifact_name;


use std::sync::Arc;

use dashmap::DashMap;

use crate::api::ControllerConfig;
use crate::api::ImageConfigRequest;
use crate::api::Pool;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::config::BackoffPolicy;
use crate::config::ControllerSettings;
use crate::events::EventRecorder;
use crate::finalizer::FinalizerManager;
use crate::pool_resolver::PoolResolver;
use crate::render::BaselineBundle;
use crate::render::TemplateRenderer;
use crate::store::Lister;
use crate::store::StoreClient;
use crate::RenderError;
use crate::Result;

/// Read caches consulted by the sync handlers
#[derive(Clone)]
pub struct Listers {
    pub requests: Arc<dyn Lister<RuntimeConfigRequest>>,
    pub images: Arc<dyn Lister<ImageConfigRequest>>,
    pub pools: Arc<dyn Lister<Pool>>,
    pub controller_configs: Arc<dyn Lister<ControllerConfig>>,
}

pub struct SyncEngine {
    store: Arc<dyn StoreClient>,
    listers: Listers,
    resolver: PoolResolver,
    renderer: Arc<dyn TemplateRenderer>,
    events: Arc<dyn EventRecorder>,
    finalizers: FinalizerManager,
    conflict_policy: BackoffPolicy,
    controller_version: String,
    /// Requests gone from the cache whose artifacts still need deleting
    deleted: DashMap<String, RuntimeConfigRequest>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn StoreClient>,
        listers: Listers,
        renderer: Arc<dyn TemplateRenderer>,
        events: Arc<dyn EventRecorder>,
        settings: &ControllerSettings,
    ) -> Self {
        let conflict_policy = settings.retry.conflict;
        Self {
            finalizers: FinalizerManager::new(store.clone(), conflict_policy),
            resolver: PoolResolver::new(listers.pools.clone()),
            store,
            listers,
            renderer,
            events,
            conflict_policy,
            controller_version: settings.controller.effective_version(),
            deleted: DashMap::new(),
        }
    }

    /// Version stamped on every artifact this engine writes
    pub fn controller_version(&self) -> &str {
        &self.controller_version
    }

    /// Remembers a request removed from the cache while it still names
    /// artifacts, so the next sync of its key deletes them
    ///
    /// Returns whether anything was left to clean up.
    pub fn track_deleted(
        &self,
        request: RuntimeConfigRequest,
    ) -> bool {
        if request.metadata.finalizers.is_empty() {
            return false;
        }
        self.deleted.insert(request.key(), request);
        true
    }

    /// Renders the baseline bundle of `pool` from the controller config snapshot
    fn baseline(
        &self,
        pool: &str,
    ) -> Result<BaselineBundle> {
        let snapshot = self
            .listers
            .controller_configs
            .list()
            .into_iter()
            .next()
            .ok_or(RenderError::MissingSnapshot)?;
        let files = self.renderer.render(&snapshot, pool)?;
        Ok(BaselineBundle::new(pool, files))
    }
}
