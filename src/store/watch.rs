/// Change notification delivered by a watch feed
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<T> {
    Added(T),
    Updated { old: T, new: T },
    Deleted(DeletedObject<T>),
    /// Initial listing has been fully delivered
    Synced,
}

/// Payload of a delete notification
///
/// A feed that lost track of an object between its last observation and the
/// deletion only knows the key and the last state it saw.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletedObject<T> {
    Live(T),
    Tombstone { key: String, obj: T },
}

impl<T> DeletedObject<T> {
    /// Recovers the deleted object from either form
    pub fn into_inner(self) -> T {
        match self {
            DeletedObject::Live(obj) => obj,
            DeletedObject::Tombstone { obj, .. } => obj,
        }
    }

    pub fn object(&self) -> &T {
        match self {
            DeletedObject::Live(obj) => obj,
            DeletedObject::Tombstone { obj, .. } => obj,
        }
    }
}
