//! Context store port
//!
//! Loads and updates per-user and per-conversation context.

use async_trait::async_trait;
use thiserror::Error;
use tradedesk_domain::{QueryContext, QueryRequest, QueryResponse, UserContext};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextStoreError {
    #[error("Context store unavailable: {0}")]
    Unavailable(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Context store error: {0}")]
    Other(String),
}

/// Port for conversation context persistence
#[async_trait]
pub trait ContextStorePort: Send + Sync {
    /// Get the user's context, creating it on first use.
    async fn load_user_context(&self, user_id: &str) -> Result<UserContext, ContextStoreError>;

    /// Build the context for a request: recent history and referenced entities.
    ///
    /// `request.conversation_id` is always set by the time this is called.
    async fn build_query_context(
        &self,
        request: &QueryRequest,
        user_context: &UserContext,
    ) -> Result<QueryContext, ContextStoreError>;

    /// Record the exchange in the conversation and update user preferences.
    async fn update_context(
        &self,
        context: &QueryContext,
        request: &QueryRequest,
        response: &QueryResponse,
    ) -> Result<(), ContextStoreError>;
}
