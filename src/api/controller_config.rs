use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::meta::impl_resource;
use super::ObjectMeta;

/// Cluster-wide inputs to baseline bundle rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ControllerConfigSpec,
}
impl_resource!(ControllerConfig, "ControllerConfig");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfigSpec {
    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub release_image: String,

    /// Pause image used by the runtime for pod sandboxes
    #[serde(default)]
    pub infra_image: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
}
