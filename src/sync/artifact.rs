use tracing::debug;

use crate::api::FileEntry;
use crate::api::ObjectMeta;
use crate::api::OwnerReference;
use crate::api::RenderedArtifact;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::constants::API_VERSION;
use crate::constants::ARTIFACT_NAME_PREFIX;
use crate::constants::GENERATED_BY_CONTROLLER_VERSION_ANNOTATION;
use crate::constants::POOL_LABEL;
use crate::constants::REGISTRIES_ARTIFACT_SUFFIX;
use crate::constants::REQUEST_NAME_ARTIFACT_SUFFIX;
use crate::envelope;
use crate::metrics::ARTIFACT_WRITES;
use crate::store::StoreClient;
use crate::MergeError;
use crate::Result;

/// `99-<pool>-<uid>`, or `99-<pool>-<name>-runtime` when the uid is unset
///
/// The fallback never ends in `-registries`, so it cannot collide with an
/// image artifact.
pub fn request_artifact_name(
    pool: &str,
    request: &RuntimeConfigRequest,
) -> String {
    if request.metadata.uid.is_empty() {
        let name = &request.metadata.name;
        return format!("{ARTIFACT_NAME_PREFIX}-{pool}-{name}-{REQUEST_NAME_ARTIFACT_SUFFIX}");
    }
    format!("{ARTIFACT_NAME_PREFIX}-{pool}-{}", request.metadata.uid)
}

/// `99-<pool>-registries`
pub fn image_artifact_name(pool: &str) -> String {
    format!("{ARTIFACT_NAME_PREFIX}-{pool}-{REGISTRIES_ARTIFACT_SUFFIX}")
}

pub fn owner_reference<T: Resource>(owner: &T) -> OwnerReference {
    OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: T::KIND.to_string(),
        name: owner.meta().name.clone(),
        uid: owner.meta().uid.clone(),
    }
}

/// Desired state of one pool's artifact
///
/// Starts from `existing` when present so the resource version used for the
/// version-checked update is the one just read. Payload, version annotation
/// and owner reference are replaced together.
pub(crate) fn build_artifact(
    existing: Option<&RenderedArtifact>,
    name: &str,
    pool: &str,
    files: Vec<FileEntry>,
    version: &str,
    owner: OwnerReference,
) -> RenderedArtifact {
    let mut artifact = existing.cloned().unwrap_or_else(|| RenderedArtifact {
        metadata: ObjectMeta::named(name),
        ..Default::default()
    });

    artifact.spec.files = files;
    artifact.metadata.annotations.clear();
    artifact
        .metadata
        .annotations
        .insert(GENERATED_BY_CONTROLLER_VERSION_ANNOTATION.to_string(), version.to_string());
    artifact.metadata.labels.insert(POOL_LABEL.to_string(), pool.to_string());
    artifact.metadata.owner_references = vec![owner];
    artifact
}

/// Version annotation of a stored artifact, if any
pub(crate) fn generated_by(artifact: &RenderedArtifact) -> Option<&str> {
    artifact
        .metadata
        .annotations
        .get(GENERATED_BY_CONTROLLER_VERSION_ANNOTATION)
        .map(String::as_str)
}

/// Creates `artifact` when it did not exist yet, updates it otherwise
pub(crate) async fn write_artifact(
    store: &dyn StoreClient,
    artifact: &RenderedArtifact,
    exists: bool,
    source: &'static str,
) -> Result<RenderedArtifact> {
    let (op, written) = if exists {
        ("update", store.update_artifact(artifact).await?)
    } else {
        ("create", store.create_artifact(artifact).await?)
    };
    ARTIFACT_WRITES.with_label_values(&[source, op]).inc();
    debug!(name = %written.metadata.name, %op, rv = %written.metadata.resource_version, "wrote artifact");
    Ok(written)
}

/// Decodes `baseline`, applies `update` and re-encodes the result under the same path
pub(crate) fn merge_file<F>(
    baseline: &FileEntry,
    update: F,
) -> std::result::Result<FileEntry, MergeError>
where
    F: FnOnce(&[u8]) -> std::result::Result<Vec<u8>, MergeError>,
{
    let decoded = envelope::decode(&baseline.contents)?;
    let merged = update(&decoded)?;
    Ok(FileEntry {
        path: baseline.path.clone(),
        mode: baseline.mode,
        contents: envelope::encode(&merged),
    })
}
