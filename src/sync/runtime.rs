use tracing::debug;
use tracing::info;
use tracing::warn;

use super::artifact::build_artifact;
use super::artifact::merge_file;
use super::artifact::owner_reference;
use super::artifact::request_artifact_name;
use super::artifact::write_artifact;
use super::status::advance_generation;
use super::status::failure_condition;
use super::status::push_condition;
use super::status::success_condition;
use super::status::REASON_NO_MATCHING_POOLS;
use super::status::REASON_SYNC_FAILED;
use super::status::REASON_VALIDATION_FAILED;
use super::SyncEngine;
use crate::api::Condition;
use crate::api::FileEntry;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::constants::CRIO_CONFIG_PATH;
use crate::constants::STORAGE_CONFIG_PATH;
use crate::events::EventType;
use crate::merge::update_runtime_config;
use crate::merge::update_storage_config;
use crate::utils::retry_on_conflict;
use crate::utils::ScopedTimer;
use crate::validation::validate_overrides;
use crate::Error;
use crate::Result;

impl SyncEngine {
    /// Deletes every artifact still named by a request that left the cache
    async fn drain_deleted(
        &self,
        key: &str,
    ) -> Result<()> {
        let Some(mut request) = self.deleted.get(key).map(|r| r.value().clone()) else {
            debug!(%key, "runtime config request has been deleted");
            return Ok(());
        };

        while !request.metadata.finalizers.is_empty() {
            self.finalizers.cascade_delete(&request).await?;
            request.metadata.finalizers.remove(0);
            self.deleted.insert(key.to_string(), request.clone());
        }
        self.deleted.remove(key);
        info!(%key, "deleted artifacts of removed runtime config request");
        Ok(())
    }

    /// Converges the runtime config request stored under `key`
    ///
    /// Validation and pool resolution failures are reported through the
    /// request status and count as handled. Any other failure is recorded the
    /// same way and also returned so the caller retries.
    pub async fn sync_runtime_config(
        &self,
        key: &str,
    ) -> Result<()> {
        let _timer = ScopedTimer::new("sync_runtime_config", key);

        let Some(mut request) = self.listers.requests.get(key) else {
            return self.drain_deleted(key).await;
        };

        if request.metadata.is_deleting() {
            return self.finalizers.cascade_delete(&request).await;
        }

        let generation = request.metadata.generation;
        if request.status.observed_generation >= generation {
            return Ok(());
        }

        if let Err(e) = validate_overrides(&request.spec.overrides) {
            let err = Error::from(e);
            warn!(%key, "invalid runtime config request: {}", err);
            self.report(&request, EventType::Warning, REASON_VALIDATION_FAILED, &err.to_string());
            return self
                .write_status(&request, Some(generation), failure_condition(REASON_VALIDATION_FAILED, &err))
                .await;
        }

        let pools = match self.resolver.resolve(&request) {
            Ok(pools) => pools,
            Err(e) => {
                let err = Error::from(e);
                info!(%key, "{}", err);
                self.report(&request, EventType::Warning, REASON_NO_MATCHING_POOLS, &err.to_string());
                return self
                    .write_status(&request, None, failure_condition(REASON_NO_MATCHING_POOLS, &err))
                    .await;
            }
        };

        for pool in &pools {
            if let Err(err) = self.apply_to_pool(&mut request, pool.name()).await {
                warn!(%key, pool = %pool.name(), "could not apply runtime config: {}", err);
                self.report(&request, EventType::Warning, REASON_SYNC_FAILED, &err.to_string());
                if let Err(status_err) = self
                    .write_status(&request, None, failure_condition(REASON_SYNC_FAILED, &err))
                    .await
                {
                    warn!(%key, "could not record failure status: {}", status_err);
                }
                return Err(err);
            }
            info!(%key, pool = %pool.name(), "applied runtime config");
        }

        let pool_names: Vec<&str> = pools.iter().map(|p| p.name()).collect();
        self.report(
            &request,
            EventType::Normal,
            "Applied",
            &format!("applied to pools {}", pool_names.join(", ")),
        );
        self.write_status(&request, Some(generation), success_condition()).await
    }

    /// Writes the pool's artifact, then records it as a finalizer on `request`
    async fn apply_to_pool(
        &self,
        request: &mut RuntimeConfigRequest,
        pool: &str,
    ) -> Result<()> {
        let name = request_artifact_name(pool, request);
        let owner = owner_reference(&*request);
        let (name_ref, owner_ref, snapshot) = (name.as_str(), &owner, &*request);

        retry_on_conflict(&self.conflict_policy, || async move {
            let existing = match self.store.get_artifact(name_ref).await {
                Ok(artifact) => Some(artifact),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };
            let files = self.request_files(pool, snapshot)?;
            let desired = build_artifact(
                existing.as_ref(),
                name_ref,
                pool,
                files,
                &self.controller_version,
                owner_ref.clone(),
            );
            write_artifact(self.store.as_ref(), &desired, existing.is_some(), "runtime_config").await
        })
        .await?;

        self.finalizers.add_finalizer(request, &name).await
    }

    /// Storage and runtime files carrying the request's overrides
    ///
    /// A category with nothing to merge, or whose baseline cannot be merged,
    /// is left out of the payload.
    fn request_files(
        &self,
        pool: &str,
        request: &RuntimeConfigRequest,
    ) -> Result<Vec<FileEntry>> {
        let overrides = &request.spec.overrides;
        let bundle = self.baseline(pool)?;
        let mut files = Vec::with_capacity(2);

        if overrides.touches_storage() {
            let baseline = bundle.require(STORAGE_CONFIG_PATH)?;
            match merge_file(baseline, |b| update_storage_config(b, overrides)) {
                Ok(file) => files.push(file),
                Err(e) => warn!(request = %request.key(), %pool, "could not merge storage config: {}", e),
            }
        }

        if overrides.touches_runtime() {
            let baseline = bundle.require(CRIO_CONFIG_PATH)?;
            match merge_file(baseline, |b| update_runtime_config(b, overrides)) {
                Ok(file) => files.push(file),
                Err(e) => warn!(request = %request.key(), %pool, "could not merge runtime config: {}", e),
            }
        }

        Ok(files)
    }

    /// Records `condition` on the latest stored copy of `request`
    ///
    /// `generation`, when given, becomes the observed generation. The write is
    /// skipped when the stored status already says the same thing, and a
    /// request that disappeared meanwhile needs no status.
    async fn write_status(
        &self,
        request: &RuntimeConfigRequest,
        generation: Option<i64>,
        condition: Condition,
    ) -> Result<()> {
        let key = request.key();
        let (key, condition) = (key.as_str(), &condition);

        let result = retry_on_conflict(&self.conflict_policy, || async move {
            let mut latest = self.store.get_runtime_config(key).await?;
            let mut changed = push_condition(&mut latest.status, condition.clone());
            if let Some(generation) = generation {
                changed |= advance_generation(&mut latest.status, generation);
            }
            if !changed {
                return Ok(());
            }
            self.store.update_runtime_config_status(&latest).await?;
            debug!(%key, observed_generation = latest.status.observed_generation, "updated status");
            Ok::<_, Error>(())
        })
        .await;

        match result {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    fn report(
        &self,
        request: &RuntimeConfigRequest,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) {
        self.events
            .record(RuntimeConfigRequest::KIND, &request.key(), event_type, reason, message);
    }
}
