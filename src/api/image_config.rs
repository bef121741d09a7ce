use serde::Deserialize;
use serde::Serialize;

use super::meta::impl_resource;
use super::ObjectMeta;

/// Cluster-wide registry policy, always named `cluster`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfigRequest {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ImageConfigSpec,
}
impl_resource!(ImageConfigRequest, "ImageConfigRequest");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfigSpec {
    #[serde(default)]
    pub registry_sources: RegistrySources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySources {
    /// Registries allowed without TLS verification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insecure_registries: Vec<String>,

    /// Registries images may never be pulled from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_registries: Vec<String>,
}

impl RegistrySources {
    pub fn is_empty(&self) -> bool {
        self.insecure_registries.is_empty() && self.blocked_registries.is_empty()
    }
}
