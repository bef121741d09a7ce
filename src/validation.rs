//! Sanity checks on a request's override set before anything is rendered.

use crate::api::Quantity;
use crate::api::RuntimeOverrides;
use crate::constants::MIN_LOG_SIZE_BYTES;
use crate::constants::MIN_PIDS_LIMIT;
use crate::constants::VALID_LOG_LEVELS;
use crate::ValidationError;

/// Rejects override sets the runtime would refuse
///
/// Zero and empty fields are unset and always pass.
pub fn validate_overrides(overrides: &RuntimeOverrides) -> Result<(), ValidationError> {
    if overrides.pids_limit > 0 && overrides.pids_limit < MIN_PIDS_LIMIT {
        return Err(ValidationError::PidsLimit(overrides.pids_limit));
    }

    let log_size_max = quantity_value("logSizeMax", &overrides.log_size_max)?;
    if log_size_max > 0 && log_size_max <= MIN_LOG_SIZE_BYTES {
        return Err(ValidationError::LogSizeMax(overrides.log_size_max.to_string()));
    }

    if !overrides.log_level.is_empty() && !VALID_LOG_LEVELS.contains(&overrides.log_level.as_str()) {
        return Err(ValidationError::LogLevel(overrides.log_level.clone()));
    }

    if quantity_value("overlaySize", &overrides.overlay_size)? < 0 {
        return Err(ValidationError::OverlaySize(overrides.overlay_size.to_string()));
    }

    Ok(())
}

fn quantity_value(
    field: &'static str,
    quantity: &Quantity,
) -> Result<i64, ValidationError> {
    if quantity.is_empty() {
        return Ok(0);
    }
    quantity.value().map_err(|reason| ValidationError::Quantity {
        field,
        value: quantity.to_string(),
        reason,
    })
}
