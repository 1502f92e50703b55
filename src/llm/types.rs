//! Common types for LLM interactions

use crate::db::Role;
use serde::Serialize;

/// Sampling temperature sent with every completion request
pub const TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens per reply
pub const MAX_OUTPUT_TOKENS: u32 = 500;

/// One entry of an assembled prompt. Timestamps are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LlmRequest {
    /// Request with the fixed generation parameters
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
