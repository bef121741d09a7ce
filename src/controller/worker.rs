use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::config::QueueConfig;
use crate::metrics::SYNC_DURATION_SECONDS;
use crate::metrics::SYNC_RESULTS;
use crate::queue::WorkQueue;
use crate::sync::SyncEngine;
use crate::Result;

/// Converges the object behind one queue key
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Reconciler: Send + Sync + 'static {
    async fn reconcile(
        &self,
        key: &str,
    ) -> Result<()>;
}

pub(crate) struct RuntimeConfigReconciler(pub(crate) Arc<SyncEngine>);

#[async_trait]
impl Reconciler for RuntimeConfigReconciler {
    async fn reconcile(
        &self,
        key: &str,
    ) -> Result<()> {
        self.0.sync_runtime_config(key).await
    }
}

pub(crate) struct ImageConfigReconciler(pub(crate) Arc<SyncEngine>);

#[async_trait]
impl Reconciler for ImageConfigReconciler {
    async fn reconcile(
        &self,
        key: &str,
    ) -> Result<()> {
        self.0.sync_image_config(key).await
    }
}

/// Drains one queue, handing each key to a [`Reconciler`]
pub struct Worker {
    queue: Arc<WorkQueue>,
    reconciler: Arc<dyn Reconciler>,
    max_retries: u32,
    cooldown: Duration,
}

impl Worker {
    pub fn new(
        queue: Arc<WorkQueue>,
        reconciler: Arc<dyn Reconciler>,
        config: &QueueConfig,
    ) -> Self {
        Self {
            queue,
            reconciler,
            max_retries: config.max_retries,
            cooldown: config.cooldown(),
        }
    }

    /// Processes keys until the queue shuts down
    pub async fn run(self) -> Result<()> {
        while self.process_next_work_item().await {}
        debug!(queue = self.queue.name(), "worker stopped");
        Ok(())
    }

    /// Handles one key; `false` once the queue is shut down
    pub async fn process_next_work_item(&self) -> bool {
        let Some(key) = self.queue.get().await else {
            return false;
        };

        let queue = self.queue.name();
        let start = Instant::now();
        let result = self.reconciler.reconcile(&key).await;
        SYNC_DURATION_SECONDS
            .with_label_values(&[queue])
            .observe(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "success" } else { "error" };
        SYNC_RESULTS.with_label_values(&[queue, outcome]).inc();

        self.handle_err(result, &key);
        self.queue.done(&key);
        true
    }

    /// Forgets `key` on success, otherwise schedules another attempt
    ///
    /// Up to `max_retries` attempts follow the rate limiter's backoff. Past
    /// that the key's backoff is reset and it comes back once after the
    /// cool-down.
    pub(crate) fn handle_err(
        &self,
        result: Result<()>,
        key: &str,
    ) {
        let Err(e) = result else {
            self.queue.forget(key);
            return;
        };

        let requeues = self.queue.num_requeues(key);
        if requeues < self.max_retries {
            warn!(queue = self.queue.name(), %key, requeues, "error syncing: {}", e);
            self.queue.add_rate_limited(key);
            return;
        }

        error!(
            queue = self.queue.name(),
            %key,
            cooldown = ?self.cooldown,
            "dropping out of the queue after {} retries: {}",
            requeues,
            e
        );
        self.queue.forget(key);
        self.queue.add_after(key, self.cooldown);
    }
}
