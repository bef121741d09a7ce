use tracing::debug;
use tracing::trace;

use super::Controller;
use crate::api::ControllerConfig;
use crate::api::ImageConfigRequest;
use crate::api::Pool;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::constants::IMAGE_CONFIG_KEY;
use crate::store::WatchEvent;

// Every handler folds the event into its cache before enqueueing, so a
// worker picking up the key already sees the new state.
impl Controller {
    pub(crate) fn on_request_event(
        &self,
        event: WatchEvent<RuntimeConfigRequest>,
    ) {
        self.caches.requests.apply(&event);
        match event {
            WatchEvent::Added(request) => {
                debug!(request = %request.key(), "adding runtime config request");
                self.request_queue.add(request.key());
            }
            WatchEvent::Updated { new, .. } => {
                trace!(request = %new.key(), "updating runtime config request");
                self.request_queue.add(new.key());
            }
            WatchEvent::Deleted(deleted) => {
                let request = deleted.into_inner();
                let key = request.key();
                debug!(request = %key, "runtime config request deleted");
                if self.engine.track_deleted(request) {
                    self.request_queue.add(key);
                }
            }
            WatchEvent::Synced => debug!(cached = self.caches.requests.len(), "runtime config requests synced"),
        }
    }

    pub(crate) fn on_image_event(
        &self,
        event: WatchEvent<ImageConfigRequest>,
    ) {
        self.caches.images.apply(&event);
        match event {
            WatchEvent::Added(_) | WatchEvent::Updated { .. } | WatchEvent::Deleted(_) => {
                self.image_queue.add(IMAGE_CONFIG_KEY);
            }
            WatchEvent::Synced => debug!("image configs synced"),
        }
    }

    /// A pool appearing or changing labels may be selected by any request and
    /// always needs a registries artifact.
    pub(crate) fn on_pool_event(
        &self,
        event: WatchEvent<Pool>,
    ) {
        self.caches.pools.apply(&event);
        match event {
            WatchEvent::Added(pool) | WatchEvent::Updated { new: pool, .. } => {
                debug!(pool = %pool.name(), "pool changed");
                self.image_queue.add(IMAGE_CONFIG_KEY);
                for key in self.caches.requests.keys() {
                    self.request_queue.add(key);
                }
            }
            WatchEvent::Deleted(deleted) => debug!(pool = %deleted.object().name(), "pool deleted"),
            WatchEvent::Synced => debug!(cached = self.caches.pools.len(), "pools synced"),
        }
    }

    pub(crate) fn on_controller_config_event(
        &self,
        event: WatchEvent<ControllerConfig>,
    ) {
        self.caches.controller_configs.apply(&event);
        match event {
            WatchEvent::Added(_) | WatchEvent::Updated { .. } => self.image_queue.add(IMAGE_CONFIG_KEY),
            WatchEvent::Deleted(_) => {}
            WatchEvent::Synced => debug!("controller configs synced"),
        }
    }
}
