use toml::Value;

use super::parse;
use super::render;
use super::table_at;
use crate::api::RuntimeOverrides;
use crate::MergeError;

/// Sets `crio.runtime.{log_level,pids_limit,log_size_max}` from the overrides
///
/// `log_size_max` is written as a byte count.
pub fn update_runtime_config(
    baseline: &[u8],
    overrides: &RuntimeOverrides,
) -> Result<Vec<u8>, MergeError> {
    let mut root = parse(baseline)?;
    if overrides.touches_runtime() {
        let runtime = table_at(&mut root, &["crio", "runtime"])?;

        if overrides.pids_limit != 0 {
            runtime.insert("pids_limit".to_string(), Value::Integer(overrides.pids_limit));
        }
        if !overrides.log_size_max.is_zero() {
            let bytes = overrides
                .log_size_max
                .value()
                .map_err(|e| MergeError::InvalidOverride(format!("log_size_max: {e}")))?;
            runtime.insert("log_size_max".to_string(), Value::Integer(bytes));
        }
        if !overrides.log_level.is_empty() {
            runtime.insert("log_level".to_string(), Value::String(overrides.log_level.clone()));
        }
    }
    render(&root)
}
