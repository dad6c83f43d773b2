//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod coordinate;
pub mod degrade;
pub mod process_query;
pub(crate) mod shared;
pub mod synthesize;
