use serde::Deserialize;
use serde::Serialize;

use super::meta::impl_resource;
use super::Condition;
use super::LabelSelector;
use super::ObjectMeta;
use super::Quantity;

/// User request to tune the container runtime on the pools it selects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigRequest {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: RuntimeConfigSpec,
    #[serde(default)]
    pub status: RuntimeConfigStatus,
}
impl_resource!(RuntimeConfigRequest, "RuntimeConfigRequest");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigSpec {
    /// Pools this request applies to. `None` or empty selects nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_selector: Option<LabelSelector>,

    #[serde(default)]
    pub overrides: RuntimeOverrides,
}

/// Settings merged over the baseline runtime and storage configuration.
/// Zero or empty fields leave the baseline untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeOverrides {
    #[serde(default)]
    pub pids_limit: i64,

    #[serde(default, skip_serializing_if = "Quantity::is_empty")]
    pub log_size_max: Quantity,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_level: String,

    #[serde(default, skip_serializing_if = "Quantity::is_empty")]
    pub overlay_size: Quantity,
}

impl RuntimeOverrides {
    /// Whether the storage category has anything to merge
    pub fn touches_storage(&self) -> bool {
        !self.overlay_size.is_zero()
    }

    /// Whether the runtime category has anything to merge
    pub fn touches_runtime(&self) -> bool {
        !self.log_level.is_empty() || self.pids_limit != 0 || !self.log_size_max.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigStatus {
    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}
