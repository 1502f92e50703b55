//! Trait abstractions for orchestrator I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::db::{Conversation, Database, DbError};
use crate::llm::{LlmError, LlmRequest, LlmService, PromptMessage};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable per-user conversation log
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the conversation owned by `owner_id`, or `None` before the first save
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Conversation>, DbError>;

    /// Atomically persist every message appended since load
    async fn save(&self, conversation: &mut Conversation) -> Result<(), DbError>;
}

/// Client for the upstream completion provider
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the assembled prompt and return the reply text
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<String, LlmError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Conversation>, DbError> {
        (**self).find_by_owner(owner_id).await
    }

    async fn save(&self, conversation: &mut Conversation) -> Result<(), DbError> {
        (**self).save(conversation).await
    }
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a `ConversationStore`
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationStore for DatabaseStore {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Conversation>, DbError> {
        self.db.find_by_owner(owner_id)
    }

    async fn save(&self, conversation: &mut Conversation) -> Result<(), DbError> {
        self.db.save(conversation)
    }
}

/// Adapter to use an `LlmService` as a `CompletionClient`
pub struct ServiceCompletionClient {
    service: Arc<dyn LlmService>,
}

impl ServiceCompletionClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CompletionClient for ServiceCompletionClient {
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        let request = LlmRequest::new(prompt.to_vec());
        let response = self.service.complete(&request).await?;
        Ok(response.text)
    }
}
