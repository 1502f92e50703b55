//! Conversation orchestrator
//!
//! Runs one user turn end to end: load, window, prompt, upstream call,
//! persist. A user turn is only ever stored together with its assistant
//! reply; when the upstream call fails nothing is written.

use super::error::ChatError;
use super::locks::ConversationLocks;
use super::prompt::build_prompt;
use super::traits::{CompletionClient, ConversationStore};
use super::window::select_context;
use crate::db::{Conversation, Message, Role};
use crate::llm::LlmError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Stored history as returned to callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Generic orchestrator that can work with any store and completion client
pub struct Orchestrator<S, C>
where
    S: ConversationStore + 'static,
    C: CompletionClient + 'static,
{
    store: Arc<S>,
    client: Arc<C>,
    locks: ConversationLocks,
}

impl<S, C> Orchestrator<S, C>
where
    S: ConversationStore + 'static,
    C: CompletionClient + 'static,
{
    pub fn new(store: S, client: C) -> Self {
        Self {
            store: Arc::new(store),
            client: Arc::new(client),
            locks: ConversationLocks::new(),
        }
    }

    /// Relay one user message and return the assistant's reply.
    ///
    /// Turns for the same user are serialized; different users proceed in
    /// parallel. Once the reply has arrived, the save runs on its own task
    /// so a caller that stops waiting cannot lose the exchange.
    pub async fn handle_user_message(
        &self,
        user_id: &str,
        raw_text: &str,
    ) -> Result<String, ChatError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidInput);
        }

        let guard = self.locks.acquire(user_id).await;

        let mut conversation = match self.store.find_by_owner(user_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => Conversation::new(user_id),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load conversation");
                return Err(ChatError::Storage(e));
            }
        };

        let window = select_context(&conversation.messages);
        let prompt = build_prompt(&window, text);
        conversation.push(Role::User, text);

        tracing::debug!(
            user_id = %user_id,
            history_len = conversation.persisted_len(),
            window_len = window.len(),
            "Requesting assistant reply"
        );

        let reply = self
            .client
            .complete(&prompt)
            .await
            .and_then(|reply| {
                let reply = reply.trim();
                if reply.is_empty() {
                    Err(LlmError::malformed("Reply text is empty"))
                } else {
                    Ok(reply.to_string())
                }
            })
            .map_err(|e| {
                tracing::error!(
                    user_id = %user_id,
                    kind = ?e.kind,
                    error = %e.message,
                    "Upstream completion failed; nothing persisted"
                );
                ChatError::Upstream(e)
            })?;

        conversation.push(Role::Assistant, reply.clone());

        let store = Arc::clone(&self.store);
        let persist = tokio::spawn(async move {
            let _guard = guard;
            store.save(&mut conversation).await
        });

        match persist.await {
            Ok(Ok(())) => {
                tracing::info!(user_id = %user_id, "Exchange persisted");
                Ok(reply)
            }
            Ok(Err(e)) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to persist exchange");
                Err(ChatError::Storage(e))
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Persistence task aborted");
                Err(ChatError::Interrupted(e.to_string()))
            }
        }
    }

    /// Full stored history for `user_id`; empty when nothing was sent yet
    pub async fn history(&self, user_id: &str) -> Result<HistoryView, ChatError> {
        let conversation = self.store.find_by_owner(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to load history");
            ChatError::Storage(e)
        })?;

        Ok(match conversation {
            Some(conversation) => HistoryView {
                messages: conversation.messages,
                created_at: Some(conversation.created_at),
                updated_at: Some(conversation.updated_at),
            },
            None => HistoryView {
                messages: Vec::new(),
                created_at: None,
                updated_at: None,
            },
        })
    }
}
