use serde::Deserialize;
use serde::Serialize;

use super::meta::impl_resource;
use super::ObjectMeta;

/// Per-pool configuration payload written by this controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedArtifact {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: RenderedSpec,
}
impl_resource!(RenderedArtifact, "RenderedArtifact");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSpec {
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A file placed on every machine of the pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub mode: u32,
    /// Data URL carrying the file contents
    pub contents: String,
}
