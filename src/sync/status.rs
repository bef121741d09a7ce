use chrono::Utc;

use crate::api::Condition;
use crate::api::RuntimeConfigStatus;
use crate::constants::CONDITION_FAILURE;
use crate::constants::CONDITION_SUCCESS;
use crate::Error;

pub(crate) const REASON_VALIDATION_FAILED: &str = "ValidationFailed";
pub(crate) const REASON_NO_MATCHING_POOLS: &str = "NoMatchingPools";
pub(crate) const REASON_SYNC_FAILED: &str = "SyncFailed";

pub(crate) fn success_condition() -> Condition {
    Condition {
        type_: CONDITION_SUCCESS.to_string(),
        status: "True".to_string(),
        reason: String::new(),
        message: "Success".to_string(),
        last_transition_time: Utc::now(),
    }
}

pub(crate) fn failure_condition(
    reason: &str,
    err: &Error,
) -> Condition {
    Condition {
        type_: CONDITION_FAILURE.to_string(),
        status: "False".to_string(),
        reason: reason.to_string(),
        message: format!("Error: {err}"),
        last_transition_time: Utc::now(),
    }
}

/// Appends `condition` unless the latest one already says the same thing
///
/// Returns whether the status changed.
pub(crate) fn push_condition(
    status: &mut RuntimeConfigStatus,
    condition: Condition,
) -> bool {
    let repeated = status
        .conditions
        .last()
        .is_some_and(|last| last.type_ == condition.type_ && last.message == condition.message);
    if repeated {
        return false;
    }
    status.conditions.push(condition);
    true
}

/// Moves `observed_generation` forward to `generation`, never backwards
pub(crate) fn advance_generation(
    status: &mut RuntimeConfigStatus,
    generation: i64,
) -> bool {
    if status.observed_generation >= generation {
        return false;
    }
    status.observed_generation = generation;
    true
}
