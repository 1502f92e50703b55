//! Context window selection
//!
//! Picks the slice of stored history that is sent upstream as grounding for
//! the next reply.

use crate::db::{Message, Role};

/// Number of prior turns considered for the context window
pub const CONTEXT_WINDOW: usize = 10;

/// Select the most recent [`CONTEXT_WINDOW`] messages and drop accidental
/// resubmissions.
///
/// A user message is dropped when the message kept immediately before it is
/// also a user message with the same trimmed content. Assistant turns and
/// differing consecutive user turns are left alone. Pure and idempotent.
pub fn select_context(history: &[Message]) -> Vec<Message> {
    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    let mut window: Vec<Message> = Vec::with_capacity(history.len() - start);

    for message in &history[start..] {
        if is_resubmission(window.last(), message) {
            continue;
        }
        window.push(message.clone());
    }

    window
}

fn is_resubmission(previous: Option<&Message>, message: &Message) -> bool {
    match previous {
        Some(prev) => {
            message.role == Role::User
                && prev.role == Role::User
                && prev.content.trim() == message.content.trim()
        }
        None => false,
    }
}
