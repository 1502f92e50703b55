//! Conversation error taxonomy

use crate::db::DbError;
use crate::llm::{ConfigError, LlmError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty or whitespace-only message
    #[error("Message is required")]
    InvalidInput,
    /// Missing provider credential or model
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] LlmError),
    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
    /// The persistence task panicked or was cancelled by the runtime
    #[error("Persistence task failed: {0}")]
    Interrupted(String),
}

impl ChatError {
    /// Message safe to show an end user. Provider and storage detail stay in
    /// the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::InvalidInput => "Message is required",
            ChatError::Upstream(_) => {
                "The assistant is unavailable right now. Please try again."
            }
            ChatError::Storage(_) | ChatError::Interrupted(_) => {
                "Failed to save the conversation. Please try again."
            }
            ChatError::Configuration(_) => "The service is not configured correctly.",
        }
    }
}
