//! Controller Error Hierarchy
//!
//! Errors are grouped by the stage of a reconciliation pass that produced them, so the
//! sync handlers can decide whether a failure is terminal for the current generation,
//! should wait for the next resync, or must be retried through the work queue.

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backing store failures (absence, conflicts, transport)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed override set on a runtime config request
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Label selector could not be parsed
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Selector parsed but no pool could be targeted
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Baseline decode or merge failures
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Baseline bundle generation failures
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Settings loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Settings that loaded but failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Background task failed to join
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },

    /// Version check failed: the object was modified since it was read
    #[error("Operation cannot be fulfilled on {kind} {name:?}: the object has been modified")]
    Conflict { kind: &'static str, name: String },

    #[error("{kind} {name:?} already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// Request rejected by the store (bad patch, missing name, ...)
    #[error("Invalid {kind} request: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[error("Store transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid PidsLimit {0}")]
    PidsLimit(i64),

    #[error("invalid LogSizeMax {0:?}, cannot be less than 8kB")]
    LogSizeMax(String),

    #[error("invalid LogLevel {0:?}, must be one of error, fatal, panic, warn, info, or debug")]
    LogLevel(String),

    #[error("invalid OverlaySize {0:?}, cannot be negative")]
    OverlaySize(String),

    #[error("invalid quantity {value:?} for {field}: {reason}")]
    Quantity {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectorError {
    #[error("invalid label key {0:?}")]
    InvalidKey(String),

    #[error("invalid label value {value:?} for key {key:?}")]
    InvalidValue { key: String, value: String },

    #[error("operator {operator} on key {key:?} requires at least one value")]
    MissingValues { key: String, operator: String },

    #[error("operator {operator} on key {key:?} does not accept values")]
    UnexpectedValues { key: String, operator: String },

    #[error("unknown selector operator {0:?}")]
    UnknownOperator(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("invalid label selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    #[error("could not find any pool for runtime config request {0}")]
    NoMatchingPools(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Baseline contents were not a well-formed data URL
    #[error("could not decode envelope: {0}")]
    Envelope(String),

    #[error("baseline is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("could not parse baseline TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("could not serialize merged TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Baseline has a non-table value where a table is required
    #[error("baseline key {0:?} is not a table")]
    NotATable(String),

    /// Override value that cannot be expressed in the target file
    #[error("invalid override: {0}")]
    InvalidOverride(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("controller config snapshot is not available")]
    MissingSnapshot,

    #[error("no templates found for pool {pool:?} under {dir}")]
    MissingTemplates { pool: String, dir: String },

    #[error("could not read template {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("generated bundle for pool {pool:?} is missing {path}")]
    MissingFile { pool: String, path: &'static str },
}

impl Error {
    /// Whether this error means the target object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(StoreError::NotFound { .. }))
    }

    /// Whether this error is an optimistic concurrency failure
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Store(StoreError::Conflict { .. }))
    }
}
