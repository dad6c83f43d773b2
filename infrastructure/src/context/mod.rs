//! Conversation context storage.
//!
//! [`InMemoryContextStore`] implements the
//! [`ContextStorePort`](tradedesk_application::ContextStorePort).

mod memory_store;

pub use memory_store::InMemoryContextStore;
