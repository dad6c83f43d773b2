//! Query vocabulary: entities, intents, complexity and the analysis record.
//!
//! - [`entity::Entity`]: a typed span with confidence
//! - [`intent::QueryIntent`]: what the user is asking for
//! - [`complexity::ComplexityTier`]: LOW / MEDIUM / HIGH with timeouts
//! - [`analysis::QueryAnalysis`]: everything the planner needs about a query
//! - [`normalize`] and [`patterns`]: text preparation and keyword patterns

pub mod analysis;
pub mod complexity;
pub mod entity;
pub mod intent;
pub mod normalize;
pub mod patterns;
