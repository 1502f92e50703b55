//! Prompt assembly

use crate::db::Message;
use crate::llm::PromptMessage;

/// Persona instruction placed first in every prompt
pub const SYSTEM_DIRECTIVE: &str =
    "You are a helpful, concise customer support assistant. Keep answers short, clear, and friendly.";

/// Build the upstream prompt: system directive, prior turns, then the new
/// user turn last so the model always answers the current question.
pub fn build_prompt(window: &[Message], new_user_text: &str) -> Vec<PromptMessage> {
    let mut prompt = Vec::with_capacity(window.len() + 2);
    prompt.push(PromptMessage::system(SYSTEM_DIRECTIVE));
    prompt.extend(
        window
            .iter()
            .map(|m| PromptMessage::new(m.role, m.content.clone())),
    );
    prompt.push(PromptMessage::user(new_user_text));
    prompt
}
