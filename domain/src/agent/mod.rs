//! Agent vocabulary: which specialized agents exist and what flows in and
//! out of an invocation.

pub mod agent_type;
pub mod value_objects;
