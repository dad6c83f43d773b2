//! Conversation context: users, messages and the entities later turns refer to.

pub mod entities;
pub mod reference;

pub use entities::{
    ContextualEntity, ContextualMessage, MessageRole, QueryContext, UserContext, UserPreferences,
};
pub use reference::{entities_in_message, extract_references};
