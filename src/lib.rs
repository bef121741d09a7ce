//! Reconciles container runtime and registry configuration requests into
//! per-pool rendered configuration artifacts.
//!
//! ## Layout
//! - [`controller`]: watch dispatch, work queues and workers
//! - [`sync`]: the request and image config reconciliation passes
//! - [`merge`]: structural TOML merge of overrides into baseline files
//! - [`finalizer`]: cascade-delete bookkeeping
//! - [`store`]: store client, caches and the in-memory store
pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod envelope;
mod errors;
pub mod events;
pub mod finalizer;
pub mod merge;
pub mod metrics;
pub mod pool_resolver;
pub mod queue;
pub mod render;
pub mod selector;
pub mod store;
pub mod sync;
pub mod utils;
pub mod validation;

pub use errors::*;

//-----------------------------------------------------------
// Unit tests

#[cfg(test)]
mod envelope_test;
#[cfg(test)]
mod finalizer_test;
#[cfg(test)]
mod selector_test;
#[cfg(test)]
mod validation_test;
