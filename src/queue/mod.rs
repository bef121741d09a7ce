//! Rate-limited work queue of object keys.
//!
//! - a key is held at most once while waiting (adds are deduplicated)
//! - a key is handed to at most one worker at a time
//! - a key added while it is being processed is queued again on `done`
//! - after `shut_down`, `get` returns `None` and new adds are ignored
mod rate_limiter;

pub use rate_limiter::*;

#[cfg(test)]
mod queue_test;
#[cfg(test)]
mod rate_limiter_test;

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use crate::metrics::QUEUE_ADDS;
use crate::metrics::QUEUE_DEPTH;
use crate::metrics::QUEUE_RETRIES;

#[derive(Default)]
struct QueueState {
    queue: VecDeque<String>,
    dirty: HashSet<String>,
    processing: HashSet<String>,
    shutting_down: bool,
}

pub struct WorkQueue {
    name: &'static str,
    state: Mutex<QueueState>,
    notify: Notify,
    limiter: Box<dyn RateLimiter>,
}

impl WorkQueue {
    pub fn new(
        name: &'static str,
        limiter: Box<dyn RateLimiter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            limiter,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn add(
        &self,
        key: impl Into<String>,
    ) {
        let key = key.into();
        let mut state = self.state.lock();
        if state.shutting_down || state.dirty.contains(&key) {
            return;
        }

        QUEUE_ADDS.with_label_values(&[self.name]).inc();
        state.dirty.insert(key.clone());
        if state.processing.contains(&key) {
            trace!(queue = self.name, %key, "key in flight, deferred until done");
            return;
        }

        state.queue.push_back(key);
        QUEUE_DEPTH.with_label_values(&[self.name]).set(state.queue.len() as i64);
        drop(state);
        self.notify.notify_one();
    }

    /// Waits for the next key; `None` once the queue is shut down
    pub async fn get(&self) -> Option<String> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.shutting_down {
                    return None;
                }
                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    QUEUE_DEPTH.with_label_values(&[self.name]).set(state.queue.len() as i64);
                    return Some(key);
                }
            }

            notified.await;
        }
    }

    /// Marks `key` as finished, re-queueing it if it was added meanwhile
    pub fn done(
        &self,
        key: &str,
    ) {
        let mut state = self.state.lock();
        state.processing.remove(key);
        if state.dirty.contains(key) && !state.shutting_down {
            state.queue.push_back(key.to_string());
            QUEUE_DEPTH.with_label_values(&[self.name]).set(state.queue.len() as i64);
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Adds `key` once `delay` has elapsed
    pub fn add_after(
        self: &Arc<Self>,
        key: impl Into<String>,
        delay: Duration,
    ) {
        let key = key.into();
        if self.is_shutting_down() {
            return;
        }
        if delay.is_zero() {
            self.add(key);
            return;
        }

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(key);
        });
    }

    /// Adds `key` after the delay chosen by the rate limiter
    pub fn add_rate_limited(
        self: &Arc<Self>,
        key: impl Into<String>,
    ) {
        let key = key.into();
        let delay = self.limiter.when(&key);
        QUEUE_RETRIES.with_label_values(&[self.name]).inc();
        trace!(queue = self.name, %key, ?delay, "rate limited requeue");
        self.add_after(key, delay);
    }

    /// Stops tracking failures of `key`
    pub fn forget(
        &self,
        key: &str,
    ) {
        self.limiter.forget(key);
    }

    pub fn num_requeues(
        &self,
        key: &str,
    ) -> u32 {
        self.limiter.num_requeues(key)
    }

    /// Number of keys waiting to be handed out
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shut_down(&self) {
        self.state.lock().shutting_down = true;
        self.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state.lock().shutting_down
    }
}
