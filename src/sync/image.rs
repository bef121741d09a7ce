use tracing::debug;
use tracing::info;
use tracing::warn;

use super::artifact::build_artifact;
use super::artifact::generated_by;
use super::artifact::image_artifact_name;
use super::artifact::merge_file;
use super::artifact::owner_reference;
use super::artifact::write_artifact;
use super::SyncEngine;
use crate::api::FileEntry;
use crate::api::ImageConfigRequest;
use crate::api::Resource;
use crate::constants::IMAGE_CONFIG_NAME;
use crate::constants::REGISTRIES_CONFIG_PATH;
use crate::events::EventType;
use crate::merge::update_registries_config;
use crate::utils::retry_on_conflict;
use crate::utils::ScopedTimer;
use crate::Error;
use crate::Result;

impl SyncEngine {
    /// Converges the registries artifact of every pool with the image config
    ///
    /// Unlike the request path, a pool whose artifact already carries the
    /// candidate files and the current controller version is not written.
    pub async fn sync_image_config(
        &self,
        key: &str,
    ) -> Result<()> {
        let _timer = ScopedTimer::new("sync_image_config", key);

        let Some(image) = self.listers.images.get(IMAGE_CONFIG_NAME) else {
            debug!(%key, "image config does not exist or has been deleted");
            return Ok(());
        };

        let pools = self.resolver.all();
        for pool in pools.iter().map(|p| p.name()) {
            let Some(candidate) = self.registries_file(pool, &image)? else {
                continue;
            };

            match self.apply_registries(pool, &image, candidate).await {
                Ok(true) => {
                    info!(%pool, "applied image config");
                    self.events.record(
                        ImageConfigRequest::KIND,
                        &image.key(),
                        EventType::Normal,
                        "Applied",
                        &format!("applied registries to pool {pool}"),
                    );
                }
                Ok(false) => debug!(%pool, "registries artifact up to date"),
                Err(e) => {
                    self.events.record(
                        ImageConfigRequest::KIND,
                        &image.key(),
                        EventType::Warning,
                        "SyncFailed",
                        &e.to_string(),
                    );
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Candidate registries file for `pool`
    ///
    /// `None` when the baseline cannot be merged; that pool is skipped.
    fn registries_file(
        &self,
        pool: &str,
        image: &ImageConfigRequest,
    ) -> Result<Option<FileEntry>> {
        let bundle = self.baseline(pool)?;
        let baseline = bundle.require(REGISTRIES_CONFIG_PATH)?;

        let sources = &image.spec.registry_sources;
        if sources.is_empty() {
            return Ok(Some(baseline.clone()));
        }

        match merge_file(baseline, |b| update_registries_config(b, sources)) {
            Ok(file) => Ok(Some(file)),
            Err(e) => {
                warn!(%pool, "could not merge registries config: {}", e);
                Ok(None)
            }
        }
    }

    /// Writes the pool's registries artifact unless it is already current
    ///
    /// Returns whether a write happened.
    async fn apply_registries(
        &self,
        pool: &str,
        image: &ImageConfigRequest,
        candidate: FileEntry,
    ) -> Result<bool> {
        let name = image_artifact_name(pool);
        let owner = owner_reference(image);
        let files = vec![candidate];
        let (name, owner, files) = (name.as_str(), &owner, &files);

        retry_on_conflict(&self.conflict_policy, || async move {
            let existing = match self.store.get_artifact(name).await {
                Ok(artifact) => Some(artifact),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };

            if let Some(current) = &existing {
                if current.spec.files == *files && generated_by(current) == Some(self.controller_version.as_str()) {
                    return Ok(false);
                }
            }

            let desired = build_artifact(
                existing.as_ref(),
                name,
                pool,
                files.clone(),
                &self.controller_version,
                owner.clone(),
            );
            write_artifact(self.store.as_ref(), &desired, existing.is_some(), "image_config").await?;
            Ok::<_, Error>(true)
        })
        .await
    }
}
