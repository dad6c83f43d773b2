//! Progress reporting during coordination

pub mod reporter;
