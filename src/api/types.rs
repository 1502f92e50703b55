//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Absent and blank are both rejected as invalid input
    #[serde(default)]
    pub message: String,
}

/// Response carrying the assistant's reply
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub response: String,
    pub message: &'static str,
}

impl SendMessageResponse {
    pub fn new(response: String) -> Self {
        Self {
            response,
            message: "Message sent successfully",
        }
    }
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
