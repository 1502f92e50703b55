//! Property-based tests for context selection and prompt assembly
//!
//! These tests verify key invariants hold across arbitrary histories:
//! - The window never exceeds the configured size or the input length
//! - Cleaning is idempotent
//! - No adjacent identical user turns survive
//! - Prompts are bracketed by the directive and the newest question

use super::prompt::{build_prompt, SYSTEM_DIRECTIVE};
use super::window::{select_context, CONTEXT_WINDOW};
use crate::db::{Message, Role};
use crate::llm::PromptMessage;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant)]
}

/// Small alphabet so duplicates are common
fn arb_content() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hi".to_string()),
        Just(" hi ".to_string()),
        Just("refund".to_string()),
        "[a-z ]{1,12}".prop_filter("non-blank", |s| !s.trim().is_empty()),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec((arb_role(), arb_content()), 0..30).prop_map(|turns| {
        turns
            .into_iter()
            .enumerate()
            .map(|(i, (role, content))| {
                let ts = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
                Message::new(role, content, ts)
            })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn window_is_bounded(history in arb_history()) {
        let window = select_context(&history);
        prop_assert!(window.len() <= CONTEXT_WINDOW);
        prop_assert!(window.len() <= history.len());
    }

    #[test]
    fn window_is_idempotent(history in arb_history()) {
        let once = select_context(&history);
        let twice = select_context(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn window_is_deterministic(history in arb_history()) {
        prop_assert_eq!(select_context(&history), select_context(&history));
    }

    #[test]
    fn no_adjacent_duplicate_user_turns(history in arb_history()) {
        let window = select_context(&history);
        for pair in window.windows(2) {
            prop_assert!(!(pair[0].role == Role::User
                && pair[1].role == Role::User
                && pair[0].content.trim() == pair[1].content.trim()));
        }
    }

    #[test]
    fn window_preserves_chronological_order(history in arb_history()) {
        let window = select_context(&history);
        for pair in window.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
        // Everything kept comes from the most recent slice
        let start = history.len().saturating_sub(CONTEXT_WINDOW);
        for message in &window {
            prop_assert!(history[start..].contains(message));
        }
    }

    #[test]
    fn prompt_bracketed_by_directive_and_question(
        history in arb_history(),
        question in "[a-zA-Z?! ]{1,40}",
    ) {
        let window = select_context(&history);
        let prompt = build_prompt(&window, &question);

        prop_assert_eq!(prompt.len(), window.len() + 2);
        prop_assert_eq!(&prompt[0], &PromptMessage::system(SYSTEM_DIRECTIVE));
        prop_assert_eq!(prompt.last().unwrap(), &PromptMessage::user(question.clone()));
        prop_assert_eq!(
            prompt.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }
}
