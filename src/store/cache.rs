use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use dashmap::DashMap;

use super::DeletedObject;
use super::Lister;
use super::WatchEvent;
use crate::api::Resource;

/// Local copy of one kind, fed by its watch events
pub struct Cache<T: Resource> {
    objects: DashMap<String, T>,
    synced: AtomicBool,
}

impl<T: Resource> Default for Cache<T> {
    fn default() -> Self {
        Self {
            objects: DashMap::new(),
            synced: AtomicBool::new(false),
        }
    }
}

impl<T: Resource> Cache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a watch event into the cache
    pub fn apply(
        &self,
        event: &WatchEvent<T>,
    ) {
        match event {
            WatchEvent::Added(obj) | WatchEvent::Updated { new: obj, .. } => {
                self.objects.insert(obj.key(), obj.clone());
            }
            WatchEvent::Deleted(DeletedObject::Live(obj)) => {
                self.objects.remove(&obj.key());
            }
            WatchEvent::Deleted(DeletedObject::Tombstone { key, .. }) => {
                self.objects.remove(key);
            }
            WatchEvent::Synced => self.synced.store(true, Ordering::Release),
        }
    }

    /// Whether the initial listing has been delivered
    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl<T: Resource> Lister<T> for Cache<T> {
    fn get(
        &self,
        key: &str,
    ) -> Option<T> {
        self.objects.get(key).map(|e| e.value().clone())
    }

    fn list(&self) -> Vec<T> {
        let mut objects: Vec<T> = self.objects.iter().map(|e| e.value().clone()).collect();
        objects.sort_by_key(|o| o.key());
        objects
    }
}
