//! Query analysis services.
//!
//! - [`extractor::EntityExtractor`]: rule-based entity extraction
//! - [`scorer::IntentScorer`]: weighted intent scoring
//! - [`assessor::ComplexityAssessor`]: complexity score and tier
//! - [`validation`]: completeness checks and multi-part decomposition
//! - [`analyzer::QueryAnalyzer`]: all of the above in one pass

pub mod analyzer;
pub mod assessor;
pub mod extractor;
pub mod scorer;
pub mod validation;

use thiserror::Error;

/// Failure of a single extraction rule; never escapes the extractor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Rule '{rule}' failed: {message}")]
    RuleFailed { rule: String, message: String },
}
