//! Conversation orchestration and history management
//!
//! Maintains each user's single conversation, chooses the context window
//! sent upstream, and reconciles replies back into stored history.

mod error;
mod locks;
mod orchestrator;
mod prompt;
pub mod traits;
mod window;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use error::ChatError;
pub use orchestrator::{HistoryView, Orchestrator};
pub use traits::*;

use crate::db::Database;
use crate::llm::{LlmConfig, LlmService, LoggingService, OpenAIService};
use std::sync::Arc;

/// Type alias for the production orchestrator with concrete implementations
pub type ProductionOrchestrator = Orchestrator<DatabaseStore, ServiceCompletionClient>;

/// Wire the production orchestrator.
///
/// Provider configuration is validated here, once, so a missing credential
/// or model stops startup instead of failing each request.
pub fn build_orchestrator(
    db: Database,
    llm_config: &LlmConfig,
) -> Result<ProductionOrchestrator, ChatError> {
    let service = OpenAIService::from_config(llm_config)?;
    tracing::info!(model = %service.model_id(), "Upstream provider configured");

    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));
    Ok(Orchestrator::new(
        DatabaseStore::new(db),
        ServiceCompletionClient::new(service),
    ))
}
