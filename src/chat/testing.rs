//! Mock implementations for testing
//!
//! These mocks enable orchestrator tests without real I/O.

use super::traits::{CompletionClient, ConversationStore};
use crate::db::{Conversation, DbError, Message, Role};
use crate::llm::{LlmError, PromptMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Completion Client
// ============================================================================

/// Completion client that returns queued replies and records every prompt
pub struct MockCompletionClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<Vec<PromptMessage>>>,
    delay: Option<Duration>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Simulate upstream latency on every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_prompts(&self) -> Vec<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock reply queued")))
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

struct StoredConversation {
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Store with the same append-only and conflict semantics as the database
pub struct InMemoryStore {
    conversations: Mutex<HashMap<String, StoredConversation>>,
    fail_saves: AtomicBool,
    save_delay: Option<Duration>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            fail_saves: AtomicBool::new(false),
            save_delay: None,
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    /// Make every save take at least `delay`
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Pre-populate history for `owner_id`
    pub fn seed(&self, owner_id: &str, turns: &[(Role, String)]) {
        let now = Utc::now();
        let messages = turns
            .iter()
            .map(|(role, content)| Message::new(*role, content.clone(), now))
            .collect();
        self.conversations.lock().unwrap().insert(
            owner_id.to_string(),
            StoredConversation {
                messages,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn messages(&self, owner_id: &str) -> Vec<Message> {
        self.conversations
            .lock()
            .unwrap()
            .get(owner_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Conversation>, DbError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .get(owner_id)
            .map(|c| {
                Conversation::from_storage(
                    owner_id.to_string(),
                    c.messages.clone(),
                    c.created_at,
                    c.updated_at,
                )
            }))
    }

    async fn save(&self, conversation: &mut Conversation) -> Result<(), DbError> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.saves.fetch_add(1, Ordering::SeqCst);

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DbError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                Some("database or disk is full".to_string()),
            )));
        }

        let now = Utc::now();
        let mut conversations = self.conversations.lock().unwrap();
        let stored = conversations
            .entry(conversation.owner_id.clone())
            .or_insert_with(|| StoredConversation {
                messages: Vec::new(),
                created_at: conversation.created_at,
                updated_at: now,
            });

        if stored.messages.len() != conversation.persisted_len() {
            return Err(DbError::Conflict {
                owner_id: conversation.owner_id.clone(),
                expected: i64::try_from(conversation.persisted_len()).unwrap(),
                found: i64::try_from(stored.messages.len()).unwrap(),
            });
        }

        stored.messages.extend_from_slice(conversation.unsaved());
        stored.updated_at = now;
        conversation.mark_persisted(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_replays_queue() {
        let mock = MockCompletionClient::new();
        mock.queue_reply("Hello");

        let prompt = vec![PromptMessage::user("hi")];
        assert_eq!(mock.complete(&prompt).await.unwrap(), "Hello");

        // Second call should fail (no more replies)
        assert!(mock.complete(&prompt).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_detects_stale_save() {
        let store = InMemoryStore::new();
        store.seed("u1", &[(Role::User, "a".into()), (Role::Assistant, "b".into())]);

        let mut stale = Conversation::new("u1");
        stale.push(Role::User, "c");
        let err = store.save(&mut stale).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
        assert_eq!(store.messages("u1").len(), 2);
    }
}
