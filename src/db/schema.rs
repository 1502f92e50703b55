//! Database schema and types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS conversations (
    owner_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    owner_id TEXT NOT NULL,
    sequence_id INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL CHECK (length(trim(content)) > 0),
    created_at TEXT NOT NULL,

    PRIMARY KEY (owner_id, sequence_id),
    FOREIGN KEY (owner_id) REFERENCES conversations(owner_id) ON DELETE CASCADE
);
";

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// The single conversation a user owns.
///
/// `persisted_len` is the number of leading messages already durable; `save`
/// writes only the tail after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub owner_id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    persisted_len: usize,
}

impl Conversation {
    /// A conversation that has not been saved yet
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            owner_id: owner_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            persisted_len: 0,
        }
    }

    /// Rebuild a conversation from durable rows
    pub(crate) fn from_storage(
        owner_id: String,
        messages: Vec<Message>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let persisted_len = messages.len();
        Self {
            owner_id,
            messages,
            created_at,
            updated_at,
            persisted_len,
        }
    }

    /// Append a message stamped with the current time.
    ///
    /// Timestamps never go backwards within a conversation, even if the
    /// wall clock does.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let mut timestamp = Utc::now();
        if let Some(last) = self.messages.last() {
            timestamp = timestamp.max(last.timestamp);
        }
        self.messages.push(Message::new(role, content, timestamp));
        &self.messages[self.messages.len() - 1]
    }

    pub fn persisted_len(&self) -> usize {
        self.persisted_len
    }

    /// Messages appended since the conversation was loaded
    pub fn unsaved(&self) -> &[Message] {
        &self.messages[self.persisted_len..]
    }

    pub(crate) fn mark_persisted(&mut self, updated_at: DateTime<Utc>) {
        self.persisted_len = self.messages.len();
        self.updated_at = updated_at;
    }
}
