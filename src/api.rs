//! HTTP API for the support relay

mod auth;
mod handlers;
mod types;

pub use auth::{IdentityProvider, StaticTokenIdentity};
pub use handlers::create_router;

use crate::chat::{ChatError, CompletionClient, ConversationStore, HistoryView, Orchestrator};
use async_trait::async_trait;
use std::sync::Arc;

/// What the HTTP layer needs from the conversation core
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(&self, user_id: &str, text: &str) -> Result<String, ChatError>;
    async fn history(&self, user_id: &str) -> Result<HistoryView, ChatError>;
}

#[async_trait]
impl<S, C> ChatBackend for Orchestrator<S, C>
where
    S: ConversationStore + 'static,
    C: CompletionClient + 'static,
{
    async fn send_message(&self, user_id: &str, text: &str) -> Result<String, ChatError> {
        self.handle_user_message(user_id, text).await
    }

    async fn history(&self, user_id: &str) -> Result<HistoryView, ChatError> {
        Orchestrator::history(self, user_id).await
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(chat: Arc<dyn ChatBackend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { chat, identity }
    }
}
