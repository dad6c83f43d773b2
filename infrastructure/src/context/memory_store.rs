//! In-memory conversation context store.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use tradedesk_application::{ContextStoreError, ContextStorePort};
use tradedesk_domain::context::{entities_in_message, extract_references};
use tradedesk_domain::{
    ContextualMessage, MessageRole, QueryContext, QueryRequest, QueryResponse, UserContext,
};

struct Conversation {
    messages: Vec<ContextualMessage>,
    last_active: DateTime<Utc>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            last_active: Utc::now(),
        }
    }

    fn trim_to(&mut self, max_messages: usize) -> usize {
        let excess = self.messages.len().saturating_sub(max_messages);
        self.messages.drain(..excess);
        excess
    }
}

/// Conversations are keyed by `(user_id, conversation_id)`.
type ConversationKey = (String, String);

/// [`ContextStorePort`] backed by process memory.
///
/// History is lost on restart. Conversations idle for longer than the
/// retention window are dropped whenever a context is built.
pub struct InMemoryContextStore {
    users: Mutex<HashMap<String, UserContext>>,
    conversations: Mutex<HashMap<ConversationKey, Conversation>>,
    max_history: usize,
    max_stored_messages: usize,
    retention: TimeDelta,
}

impl InMemoryContextStore {
    pub const DEFAULT_MAX_HISTORY: usize = 10;
    pub const DEFAULT_MAX_STORED_MESSAGES: usize = 100;
    pub const DEFAULT_RETENTION_HOURS: u64 = 24;

    pub fn new(max_history: usize, retention_hours: u64) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            conversations: Mutex::new(HashMap::new()),
            max_history,
            max_stored_messages: Self::DEFAULT_MAX_STORED_MESSAGES.max(max_history),
            retention: i64::try_from(retention_hours)
                .ok()
                .and_then(TimeDelta::try_hours)
                .unwrap_or(TimeDelta::MAX),
        }
    }

    /// Cap on messages kept per conversation (never below `max_history`).
    pub fn with_max_stored_messages(mut self, max: usize) -> Self {
        self.max_stored_messages = max.max(self.max_history);
        self
    }

    /// Trim the user's conversations to `max_messages` and drop stale ones.
    ///
    /// Returns the number of messages removed.
    pub fn maintain_memory(&self, user_id: &str, max_messages: usize) -> Result<usize, ContextStoreError> {
        let mut conversations = self.conversations()?;
        let mut removed = self.purge_stale(&mut conversations);
        for ((owner, _), conversation) in conversations.iter_mut() {
            if owner == user_id {
                removed += conversation.trim_to(max_messages);
            }
        }
        debug!(
            "Maintained memory for user {} (max {} messages, {} removed)",
            user_id, max_messages, removed
        );
        Ok(removed)
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations().map(|c| c.len()).unwrap_or(0)
    }

    /// Stored preferences and timestamps for a user, if known.
    pub fn user_context(&self, user_id: &str) -> Option<UserContext> {
        self.users().ok()?.get(user_id).cloned()
    }

    fn purge_stale(&self, conversations: &mut HashMap<ConversationKey, Conversation>) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(self.retention) else {
            return 0;
        };
        let mut removed = 0;
        conversations.retain(|_, conversation| {
            let keep = conversation.last_active >= cutoff;
            if !keep {
                removed += conversation.messages.len();
            }
            keep
        });
        removed
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<String, UserContext>>, ContextStoreError> {
        self.users
            .lock()
            .map_err(|_| ContextStoreError::Unavailable("user table lock poisoned".to_string()))
    }

    fn conversations(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ConversationKey, Conversation>>, ContextStoreError> {
        self.conversations
            .lock()
            .map_err(|_| ContextStoreError::Unavailable("conversation table lock poisoned".to_string()))
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_HISTORY, Self::DEFAULT_RETENTION_HOURS)
    }
}

fn user_key(user_id: &str) -> &str {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        UserContext::ANONYMOUS
    } else {
        trimmed
    }
}

#[async_trait]
impl ContextStorePort for InMemoryContextStore {
    async fn load_user_context(&self, user_id: &str) -> Result<UserContext, ContextStoreError> {
        let key = user_key(user_id);
        let mut users = self.users()?;
        let user = users.entry(key.to_string()).or_insert_with(|| {
            debug!("Creating context for user {}", key);
            UserContext::new(key)
        });
        user.touch();
        Ok(user.clone())
    }

    async fn build_query_context(
        &self,
        request: &QueryRequest,
        user_context: &UserContext,
    ) -> Result<QueryContext, ContextStoreError> {
        let conversation_id = request
            .existing_conversation()
            .ok_or_else(|| ContextStoreError::ConversationNotFound("<none>".to_string()))?;

        let history = {
            let mut conversations = self.conversations()?;
            self.purge_stale(&mut conversations);
            let key = (user_context.user_id.clone(), conversation_id.to_string());
            conversations
                .get(&key)
                .map(|conversation| {
                    let start = conversation.messages.len().saturating_sub(self.max_history);
                    conversation.messages[start..].to_vec()
                })
                .unwrap_or_default()
        };

        let referenced = extract_references(&request.query, &history);
        debug!(
            "Built context for conversation {}: {} messages, {} references",
            conversation_id,
            history.len(),
            referenced.len()
        );

        Ok(
            QueryContext::new(request.query.clone(), conversation_id, user_context.clone())
                .with_history(history)
                .with_referenced_entities(referenced),
        )
    }

    async fn update_context(
        &self,
        context: &QueryContext,
        request: &QueryRequest,
        response: &QueryResponse,
    ) -> Result<(), ContextStoreError> {
        let user_id = user_key(&context.user_context.user_id).to_string();

        {
            let mut users = self.users()?;
            let user = users
                .entry(user_id.clone())
                .or_insert_with(|| context.user_context.clone());
            user.preferences.record_query(&request.query);
            user.touch();
        }

        let mut conversations = self.conversations()?;
        let conversation = conversations
            .entry((user_id, response.conversation_id.clone()))
            .or_insert_with(Conversation::new);
        conversation.messages.push(
            ContextualMessage::new(MessageRole::User, request.query.clone())
                .with_entities(entities_in_message(&request.query)),
        );
        conversation.messages.push(
            ContextualMessage::new(MessageRole::Assistant, response.response.clone())
                .with_entities(entities_in_message(&response.response)),
        );
        conversation.last_active = Utc::now();
        conversation.trim_to(self.max_stored_messages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradedesk_domain::UserPreferences;

    fn request(query: &str, conversation_id: &str) -> QueryRequest {
        QueryRequest::new(query, "trader-1").with_conversation_id(conversation_id)
    }

    async fn exchange(store: &InMemoryContextStore, query: &str, answer: &str) {
        let user = store.load_user_context("trader-1").await.unwrap();
        let req = request(query, "c1");
        let context = store.build_query_context(&req, &user).await.unwrap();
        let response = QueryResponse::success(answer, "c1", vec![], 1);
        store.update_context(&context, &req, &response).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_user_context_get_or_create() {
        let store = InMemoryContextStore::default();
        let first = store.load_user_context("trader-1").await.unwrap();
        let second = store.load_user_context("trader-1").await.unwrap();
        assert_eq!(first.created_at, second.created_at);

        let anonymous = store.load_user_context("   ").await.unwrap();
        assert_eq!(anonymous.user_id, UserContext::ANONYMOUS);
    }

    #[tokio::test]
    async fn test_history_and_references_are_built() {
        let store = InMemoryContextStore::default();
        exchange(
            &store,
            "What's the tariff on steel from China?",
            "Steel from China carries a 25% tariff.",
        )
        .await;

        let user = store.load_user_context("trader-1").await.unwrap();
        let context = store
            .build_query_context(&request("What about the steel we discussed?", "c1"), &user)
            .await
            .unwrap();

        assert_eq!(context.history.len(), 2);
        assert_eq!(context.history[0].role, MessageRole::User);
        assert!(context.history[0].entities.iter().any(|e| e.kind == "concept"));
        assert!(context.has_entity("product", "steel"));
    }

    #[tokio::test]
    async fn test_history_is_limited_to_recent_messages() {
        let store = InMemoryContextStore::new(4, 24);
        for i in 0..5 {
            exchange(&store, &format!("question {i}"), &format!("answer {i}")).await;
        }
        let user = store.load_user_context("trader-1").await.unwrap();
        let context = store
            .build_query_context(&request("next", "c1"), &user)
            .await
            .unwrap();

        assert_eq!(context.history.len(), 4);
        assert_eq!(context.history[3].content, "answer 4");
    }

    #[tokio::test]
    async fn test_conversations_are_per_user() {
        let store = InMemoryContextStore::default();
        exchange(&store, "Tariff on steel from China", "25%").await;

        let other = store.load_user_context("trader-2").await.unwrap();
        let context = store
            .build_query_context(&request("hello again", "c1"), &other)
            .await
            .unwrap();
        assert!(context.history.is_empty());
    }

    #[tokio::test]
    async fn test_update_records_preferences() {
        let store = InMemoryContextStore::default();
        exchange(&store, "Compare costs for China versus Vietnam", "...").await;

        let prefs = store.user_context("trader-1").unwrap().preferences;
        assert_eq!(prefs.get(UserPreferences::COMPARISON_QUERIES), 1);
        assert_eq!(prefs.get(UserPreferences::COST_FOCUSED), 1);
    }

    #[tokio::test]
    async fn test_missing_conversation_id_is_an_error() {
        let store = InMemoryContextStore::default();
        let user = store.load_user_context("trader-1").await.unwrap();
        let result = store
            .build_query_context(&QueryRequest::new("q", "trader-1"), &user)
            .await;
        assert!(matches!(
            result,
            Err(ContextStoreError::ConversationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_maintain_memory_trims_and_purges() {
        let store = InMemoryContextStore::default();
        for i in 0..3 {
            exchange(&store, &format!("question {i}"), "answer").await;
        }
        assert_eq!(store.maintain_memory("trader-1", 2).unwrap(), 4);

        let expired = InMemoryContextStore::new(10, 0);
        exchange(&expired, "question", "answer").await;
        assert_eq!(expired.conversation_count(), 1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        expired.maintain_memory("trader-1", 10).unwrap();
        assert_eq!(expired.conversation_count(), 0);
    }
}
