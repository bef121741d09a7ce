use std::sync::Arc;

use tracing::debug;

use crate::api::Pool;
use crate::api::Resource;
use crate::api::RuntimeConfigRequest;
use crate::selector::Selector;
use crate::store::Lister;
use crate::ResolutionError;

/// Resolves a request's pool selector against the cached pools
pub struct PoolResolver {
    pools: Arc<dyn Lister<Pool>>,
}

impl PoolResolver {
    pub fn new(pools: Arc<dyn Lister<Pool>>) -> Self {
        Self { pools }
    }

    /// Pools selected by `request`, sorted by name
    ///
    /// A missing or empty selector selects nothing, which is reported the same
    /// way as a selector no pool satisfies.
    pub fn resolve(
        &self,
        request: &RuntimeConfigRequest,
    ) -> Result<Vec<Pool>, ResolutionError> {
        let selector = Selector::parse(request.spec.pool_selector.as_ref())?;

        let mut pools: Vec<Pool> = self
            .pools
            .list()
            .into_iter()
            .filter(|p| selector.matches(&p.metadata.labels))
            .collect();

        if pools.is_empty() {
            return Err(ResolutionError::NoMatchingPools(request.key()));
        }

        pools.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        debug!(
            request = %request.key(),
            pools = ?pools.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "resolved pools"
        );
        Ok(pools)
    }

    /// Every known pool, sorted by name
    pub fn all(&self) -> Vec<Pool> {
        let mut pools = self.pools.list();
        pools.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        pools
    }
}
