// -
// Object identity

/// API group/version stamped on owner references this controller writes
pub const API_VERSION: &str = "ctrcfg.io/v1";

/// Fixed name of the cluster-wide image config singleton
pub const IMAGE_CONFIG_NAME: &str = "cluster";

/// Queue key used for every image config notification
pub const IMAGE_CONFIG_KEY: &str = IMAGE_CONFIG_NAME;

/// Prefix shared by every rendered artifact name; sorts after the baseline bundle
pub const ARTIFACT_NAME_PREFIX: &str = "99";

/// Suffix distinguishing image-path artifacts from request-path artifacts
pub const REGISTRIES_ARTIFACT_SUFFIX: &str = "registries";

/// Suffix on request artifacts named after a request without a uid
pub const REQUEST_NAME_ARTIFACT_SUFFIX: &str = "runtime";

// -
// Metadata keys

/// Annotation recording the controller version that produced an artifact
pub const GENERATED_BY_CONTROLLER_VERSION_ANNOTATION: &str =
    "ctrcfg.io/generated-by-controller-version";

/// Label recording the pool an artifact targets
pub const POOL_LABEL: &str = "ctrcfg.io/pool";

// -
// Rendered file layout

pub const STORAGE_CONFIG_PATH: &str = "/etc/containers/storage.conf";
pub const CRIO_CONFIG_PATH: &str = "/etc/crio/crio.conf";
pub const REGISTRIES_CONFIG_PATH: &str = "/etc/containers/registries.conf";

/// File mode for every rendered file (0644)
pub const RENDERED_FILE_MODE: u32 = 0o644;

// -
// Override validation bounds

pub const MIN_PIDS_LIMIT: i64 = 20;
pub const MIN_LOG_SIZE_BYTES: i64 = 8192;
pub const VALID_LOG_LEVELS: [&str; 6] = ["error", "fatal", "panic", "warn", "info", "debug"];

// -
// Status conditions

pub const CONDITION_SUCCESS: &str = "Success";
pub const CONDITION_FAILURE: &str = "Failure";

/// Event source component name
pub const EVENT_COMPONENT: &str = "ctrcfg-controller";

/// Crate version used as the default controller version
pub const CONTROLLER_VERSION: &str = env!("CARGO_PKG_VERSION");
