//! Event dispatch and worker lifecycle.
//!
//! ## Key Responsibilities
//! - Folds watch events into the local caches
//! - Translates object notifications into queue keys
//! - Starts the workers once every cache has synced
//! - Re-enqueues every known object on the resync period
//! - Stops queue intake on shutdown and waits for in-flight handlers
mod handlers;
mod worker;

pub use worker::*;


use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::api::ControllerConfig;
use crate::api::ImageConfigRequest;
use crate::api::Pool;
use crate::api::RuntimeConfigRequest;
use crate::config::ControllerSettings;
use crate::config::QueueConfig;
use crate::constants::IMAGE_CONFIG_KEY;
use crate::events::EventRecorder;
use crate::queue::default_controller_rate_limiter;
use crate::queue::WorkQueue;
use crate::render::TemplateRenderer;
use crate::store::Cache;
use crate::store::MemoryStore;
use crate::store::StoreClient;
use crate::store::WatchEvent;
use crate::sync::Listers;
use crate::sync::SyncEngine;
use crate::utils::spawn_task;
use crate::Result;

pub const RUNTIME_CONFIG_QUEUE: &str = "runtime-config";
pub const IMAGE_CONFIG_QUEUE: &str = "image-config";

/// Watch feeds of every kind the controller consumes
pub struct Feeds {
    pub pools: UnboundedReceiver<WatchEvent<Pool>>,
    pub requests: UnboundedReceiver<WatchEvent<RuntimeConfigRequest>>,
    pub images: UnboundedReceiver<WatchEvent<ImageConfigRequest>>,
    pub controller_configs: UnboundedReceiver<WatchEvent<ControllerConfig>>,
}

impl Feeds {
    pub fn from_memory_store(store: &MemoryStore) -> Self {
        Self {
            pools: store.watch_pools(),
            requests: store.watch_runtime_configs(),
            images: store.watch_image_configs(),
            controller_configs: store.watch_controller_configs(),
        }
    }
}

/// Local caches fed by [`Feeds`]
#[derive(Default)]
pub struct Caches {
    pub pools: Arc<Cache<Pool>>,
    pub requests: Arc<Cache<RuntimeConfigRequest>>,
    pub images: Arc<Cache<ImageConfigRequest>>,
    pub controller_configs: Arc<Cache<ControllerConfig>>,
}

impl Caches {
    pub fn has_synced(&self) -> bool {
        self.pools.has_synced()
            && self.requests.has_synced()
            && self.images.has_synced()
            && self.controller_configs.has_synced()
    }

    fn listers(&self) -> Listers {
        Listers {
            requests: self.requests.clone(),
            images: self.images.clone(),
            pools: self.pools.clone(),
            controller_configs: self.controller_configs.clone(),
        }
    }
}

pub struct Controller {
    engine: Arc<SyncEngine>,
    caches: Caches,
    request_queue: Arc<WorkQueue>,
    image_queue: Arc<WorkQueue>,
    workers: usize,
    queue_config: QueueConfig,
    resync_period: Option<Duration>,
}

impl Controller {
    pub fn new(
        store: Arc<dyn StoreClient>,
        renderer: Arc<dyn TemplateRenderer>,
        events: Arc<dyn EventRecorder>,
        settings: &ControllerSettings,
    ) -> Self {
        let caches = Caches::default();
        let engine = SyncEngine::new(store, caches.listers(), renderer, events, settings);
        let queue = &settings.queue;
        let resync_secs = settings.controller.resync_period_secs;

        Self {
            engine: Arc::new(engine),
            caches,
            request_queue: WorkQueue::new(RUNTIME_CONFIG_QUEUE, Box::new(default_controller_rate_limiter(queue))),
            image_queue: WorkQueue::new(IMAGE_CONFIG_QUEUE, Box::new(default_controller_rate_limiter(queue))),
            workers: settings.controller.workers,
            queue_config: queue.clone(),
            resync_period: (resync_secs > 0).then(|| Duration::from_secs(resync_secs)),
        }
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn request_queue(&self) -> &Arc<WorkQueue> {
        &self.request_queue
    }

    pub fn image_queue(&self) -> &Arc<WorkQueue> {
        &self.image_queue
    }

    /// Runs until `shutdown` fires
    ///
    /// Workers start after all caches synced. On exit the queues stop handing
    /// out keys and the call returns once in-flight handlers finished.
    pub async fn run(
        &self,
        mut feeds: Feeds,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        info!(workers = self.workers, "starting runtime config controller");

        let mut handles = Vec::new();
        let mut resync = self.resync_period.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                biased;
                // P0: shutdown
                _ = shutdown.changed() => {
                    warn!("shutdown signal received");
                    break;
                }
                // P1: watch events
                Some(event) = feeds.requests.recv() => self.on_request_event(event),
                Some(event) = feeds.images.recv() => self.on_image_event(event),
                Some(event) = feeds.pools.recv() => self.on_pool_event(event),
                Some(event) = feeds.controller_configs.recv() => self.on_controller_config_event(event),
                // P2: periodic resync
                _ = next_tick(&mut resync), if !handles.is_empty() => self.resync(),
            }

            if handles.is_empty() && self.caches.has_synced() {
                info!("caches synced, starting workers");
                self.spawn_workers(&mut handles);
            }
        }

        self.request_queue.shut_down();
        self.image_queue.shut_down();
        for joined in join_all(handles).await {
            joined?;
        }
        info!("runtime config controller stopped");
        Ok(())
    }

    fn spawn_workers(
        &self,
        handles: &mut Vec<JoinHandle<()>>,
    ) {
        let reconciler: Arc<dyn Reconciler> = Arc::new(RuntimeConfigReconciler(self.engine.clone()));
        for i in 0..self.workers {
            let worker = Worker::new(self.request_queue.clone(), reconciler.clone(), &self.queue_config);
            spawn_task(&format!("{RUNTIME_CONFIG_QUEUE}-worker-{i}"), move || worker.run(), Some(&mut *handles));
        }

        let worker = Worker::new(
            self.image_queue.clone(),
            Arc::new(ImageConfigReconciler(self.engine.clone())),
            &self.queue_config,
        );
        spawn_task(&format!("{IMAGE_CONFIG_QUEUE}-worker"), move || worker.run(), Some(handles));
    }

    /// Re-enqueues every cached request and the image config
    pub(crate) fn resync(&self) {
        let keys = self.caches.requests.keys();
        debug!(requests = keys.len(), "periodic resync");
        for key in keys {
            self.request_queue.add(key);
        }
        if !self.caches.images.is_empty() {
            self.image_queue.add(IMAGE_CONFIG_KEY);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}
