//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: parsing and validation errors for value objects
//! - [`string`]: text helpers used by normalization and previews

pub mod error;
pub mod string;
