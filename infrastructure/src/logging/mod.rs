//! Logging infrastructure: structured query logging.
//!
//! Provides [`JsonlQueryLogger`], a JSONL file writer that implements
//! the [`QueryLogger`](tradedesk_application::QueryLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlQueryLogger;
