//! HTTP request handlers

use super::auth::AuthenticatedUser;
use super::types::{ErrorResponse, HealthResponse, SendMessageRequest, SendMessageResponse};
use super::AppState;
use crate::chat::{ChatError, HistoryView};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/send", post(send_message))
        .route("/api/chat/history", get(get_history))
        .route("/api/health", get(health))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected send body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;
    let reply = state.chat.send_message(&user_id, &req.message).await?;
    Ok(Json(SendMessageResponse::new(reply)))
}

async fn get_history(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<HistoryView>, AppError> {
    let history = state.chat.history(&user_id).await?;
    Ok(Json(history))
}

// ============================================================
// Health
// ============================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
    })
}

// ============================================================
// Error Handling
// ============================================================

pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    BadGateway(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        // Full detail was logged where the error arose
        let message = err.user_message().to_string();
        match err {
            ChatError::InvalidInput => AppError::BadRequest(message),
            ChatError::Upstream(_) => AppError::BadGateway(message),
            ChatError::Storage(_) | ChatError::Interrupted(_) | ChatError::Configuration(_) => {
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
