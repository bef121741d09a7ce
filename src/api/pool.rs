use serde::Deserialize;
use serde::Serialize;

use super::meta::impl_resource;
use super::ObjectMeta;

/// Named group of machines; selected through its metadata labels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub metadata: ObjectMeta,
}
impl_resource!(Pool, "Pool");

impl Pool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
        }
    }

    pub fn with_label(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }
}
