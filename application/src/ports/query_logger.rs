//! Port for structured query logging.
//!
//! Defines the [`QueryLogger`] trait for recording pipeline events
//! (plan built, query completed, query degraded) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures one machine-readable
//! record per event (JSONL).

use serde_json::Value;

/// A structured pipeline event, always tied to one conversation.
pub struct QueryEvent {
    /// Event type identifier (e.g., "plan_built", "query_completed").
    pub event_type: &'static str,
    pub conversation_id: String,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl QueryEvent {
    pub fn new(event_type: &'static str, conversation_id: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type,
            conversation_id: conversation_id.into(),
            payload,
        }
    }
}

/// Port for logging query events.
///
/// `log` is synchronous and infallible; logging failures never disturb
/// query processing.
pub trait QueryLogger: Send + Sync {
    fn log(&self, event: QueryEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoQueryLogger;

impl QueryLogger for NoQueryLogger {
    fn log(&self, _event: QueryEvent) {}
}
