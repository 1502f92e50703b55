//! Helpdesk relay - customer support chat backed by an LLM
//!
//! Authenticated users exchange messages with an AI assistant; each user's
//! history is persisted and replayed as context on later turns.

mod api;
mod chat;
mod db;
mod llm;

use api::{create_router, AppState, StaticTokenIdentity};
use chat::build_orchestrator;
use db::Database;
use llm::LlmConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_relay=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("RELAY_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.helpdesk-relay/relay.db")
    });

    let port: u16 = std::env::var("RELAY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    // Provider settings are checked once; refuse to serve without them
    let orchestrator = match build_orchestrator(db, &LlmConfig::from_env()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Invalid upstream configuration");
            return Err(e.into());
        }
    };

    let identity = StaticTokenIdentity::from_env()?;
    if identity.is_empty() {
        tracing::warn!("No API tokens configured. Set RELAY_API_TOKENS; every request will be rejected.");
    } else {
        tracing::info!(tokens = identity.len(), "Identity provider initialized");
    }

    // Create application state
    let state = AppState::new(Arc::new(orchestrator), Arc::new(identity));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Helpdesk relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
