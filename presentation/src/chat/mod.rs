//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface over the query
//! pipeline.

mod repl;

pub use repl::ChatRepl;
