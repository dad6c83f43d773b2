//! Output formatting for query responses and plans

pub mod console;
pub mod formatter;
