//! Event recording side channel. Nothing reads events back.

#[cfg(test)]
use mockall::automock;
use tracing::info;
use tracing::warn;

use crate::constants::EVENT_COMPONENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

/// Attaches human-readable events to reconciled objects
#[cfg_attr(test, automock)]
pub trait EventRecorder: Send + Sync + 'static {
    fn record(
        &self,
        kind: &'static str,
        key: &str,
        event_type: EventType,
        reason: &str,
        message: &str,
    );
}

/// Emits events as structured log lines
#[derive(Debug, Default, Clone)]
pub struct TracingEventRecorder;

impl EventRecorder for TracingEventRecorder {
    fn record(
        &self,
        kind: &'static str,
        key: &str,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) {
        match event_type {
            EventType::Normal => {
                info!(component = EVENT_COMPONENT, %kind, object = %key, %reason, "{}", message)
            }
            EventType::Warning => {
                warn!(component = EVENT_COMPONENT, %kind, object = %key, %reason, "{}", message)
            }
        }
    }
}
