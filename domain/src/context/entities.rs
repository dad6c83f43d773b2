//! Conversation context entities.

use crate::query::entity::{Entity, EntityType};
use crate::query::patterns::{COMPARISON, COMPLIANCE, COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Something mentioned earlier in a conversation that later turns may refer to.
///
/// `kind` is an entity type name (`country`, `product`, ...) or a concept
/// such as `tariff` that has no [`EntityType`] counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualEntity {
    pub kind: String,
    pub value: String,
    pub confidence: f64,
    pub last_mentioned: DateTime<Utc>,
    pub mention_count: u32,
}

impl ContextualEntity {
    pub fn new(kind: impl Into<String>, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            last_mentioned: Utc::now(),
            mention_count: 1,
        }
    }

    /// Case-insensitive match on both kind and value.
    pub fn matches(&self, kind: &str, value: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind) && self.value.eq_ignore_ascii_case(value)
    }

    pub fn record_mention(&mut self) {
        self.mention_count += 1;
        self.last_mentioned = Utc::now();
    }

    /// Entity type when the kind names one; concepts yield `None`.
    pub fn entity_type(&self) -> Option<EntityType> {
        self.kind.parse().ok()
    }

    /// Convert into a query entity at the given confidence.
    pub fn to_entity(&self, confidence: f64) -> Option<Entity> {
        self.entity_type()
            .map(|entity_type| Entity::new(entity_type, self.value.clone(), confidence))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub entities: Vec<ContextualEntity>,
}

impl ContextualMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            entities: Vec::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<ContextualEntity>) -> Self {
        self.entities = entities;
        self
    }
}

/// Counters describing what a user tends to ask about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    counters: HashMap<String, u32>,
}

impl UserPreferences {
    pub const COMPARISON_QUERIES: &'static str = "comparison_queries";
    pub const COST_FOCUSED: &'static str = "cost_focused";
    pub const COMPLIANCE_FOCUSED: &'static str = "compliance_focused";

    pub fn increment(&mut self, key: &str) {
        *self.counters.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> u32 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Bump the counters whose keywords appear in the query.
    pub fn record_query(&mut self, query: &str) {
        if COMPARISON.is_match(query) {
            self.increment(Self::COMPARISON_QUERIES);
        }
        if COST.is_match(query) {
            self.increment(Self::COST_FOCUSED);
        }
        if COMPLIANCE.is_match(query) {
            self.increment(Self::COMPLIANCE_FOCUSED);
        }
    }

    /// The most-incremented counter, ties broken alphabetically.
    pub fn dominant(&self) -> Option<&str> {
        self.counters
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(key, _)| key.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl UserContext {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            preferences: UserPreferences::default(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

/// Everything known about the conversation when a query arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    pub query: String,
    pub conversation_id: String,
    pub user_context: UserContext,
    pub history: Vec<ContextualMessage>,
    pub referenced_entities: Vec<ContextualEntity>,
    pub timestamp: DateTime<Utc>,
}

impl QueryContext {
    pub fn new(
        query: impl Into<String>,
        conversation_id: impl Into<String>,
        user_context: UserContext,
    ) -> Self {
        Self {
            query: query.into(),
            conversation_id: conversation_id.into(),
            user_context,
            history: Vec::new(),
            referenced_entities: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Context with no history, used when the store is unavailable.
    pub fn minimal(query: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self::new(query, conversation_id, UserContext::anonymous())
    }

    pub fn with_history(mut self, history: Vec<ContextualMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_referenced_entities(mut self, entities: Vec<ContextualEntity>) -> Self {
        self.referenced_entities = entities;
        self
    }

    pub fn entities_by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ContextualEntity> {
        self.referenced_entities
            .iter()
            .filter(move |e| e.kind.eq_ignore_ascii_case(kind))
    }

    pub fn has_entity(&self, kind: &str, value: &str) -> bool {
        self.referenced_entities.iter().any(|e| e.matches(kind, value))
    }

    /// The last `limit` messages from the given role, oldest first.
    pub fn recent_messages(&self, role: MessageRole, limit: usize) -> Vec<&ContextualMessage> {
        let matching: Vec<_> = self.history.iter().filter(|m| m.role == role).collect();
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_entity_conversion() {
        let country = ContextualEntity::new("country", "China", 0.8);
        assert_eq!(country.to_entity(0.7).unwrap().entity_type, EntityType::Country);

        let concept = ContextualEntity::new("concept", "tariff", 0.9);
        assert!(concept.to_entity(0.7).is_none());
    }

    #[test]
    fn test_preferences_counters() {
        let mut prefs = UserPreferences::default();
        prefs.increment(UserPreferences::COST_FOCUSED);
        prefs.increment(UserPreferences::COST_FOCUSED);
        prefs.increment(UserPreferences::COMPARISON_QUERIES);

        assert_eq!(prefs.get(UserPreferences::COST_FOCUSED), 2);
        assert_eq!(prefs.get(UserPreferences::COMPLIANCE_FOCUSED), 0);
        assert_eq!(prefs.dominant(), Some(UserPreferences::COST_FOCUSED));
    }

    #[test]
    fn test_record_query_classifies_keywords() {
        let mut prefs = UserPreferences::default();
        prefs.record_query("Compare the cost of steel from China versus Japan");
        prefs.record_query("What customs documentation do I need?");

        assert_eq!(prefs.get(UserPreferences::COMPARISON_QUERIES), 1);
        assert_eq!(prefs.get(UserPreferences::COST_FOCUSED), 1);
        assert_eq!(prefs.get(UserPreferences::COMPLIANCE_FOCUSED), 1);
    }

    #[test]
    fn test_recent_messages_returns_latest_of_role() {
        let context = QueryContext::minimal("q", "c1").with_history(vec![
            ContextualMessage::new(MessageRole::User, "first"),
            ContextualMessage::new(MessageRole::Assistant, "answer"),
            ContextualMessage::new(MessageRole::User, "second"),
            ContextualMessage::new(MessageRole::User, "third"),
        ]);

        let recent: Vec<_> = context
            .recent_messages(MessageRole::User, 2)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(recent, vec!["second", "third"]);
    }

    #[test]
    fn test_has_entity_is_case_insensitive() {
        let context = QueryContext::minimal("q", "c1")
            .with_referenced_entities(vec![ContextualEntity::new("country", "China", 0.8)]);
        assert!(context.has_entity("COUNTRY", "china"));
        assert_eq!(context.entities_by_kind("country").count(), 1);
    }
}
