//! Persisted conversation transcripts.

use crate::{Message, Phase, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Title used when no user message is available.
pub const DEFAULT_TITLE: &str = "New Conversation";

const TITLE_MAX_CHARS: usize = 50;
const TITLE_KEEP_CHARS: usize = 47;

static TITLE_STRIP: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^\w\s\-.,!?]").expect("Valid title regex"));

/// Derive a conversation title from its first user message.
///
/// Messages longer than 50 characters keep their first 47 followed by `...`.
/// Characters other than word characters, whitespace and `-.,!?` are dropped.
///
/// # Examples
///
/// ```
/// use vignette_core::{derive_title, Message};
///
/// let title = derive_title(&[Message::user("What was life like in 1906 San Francisco?")]);
/// assert_eq!(title, "What was life like in 1906 San Francisco?");
/// assert_eq!(derive_title(&[]), "New Conversation");
/// ```
pub fn derive_title(messages: &[Message]) -> String {
    let first = messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    if first.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    let shortened = if first.chars().count() > TITLE_MAX_CHARS {
        let head: String = first.chars().take(TITLE_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        first.to_string()
    };
    let cleaned = TITLE_STRIP.replace_all(&shortened, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// A conversation transcript and where it stands in the guided flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Caller-chosen id
    pub id: String,
    /// Derived from the first user message
    pub title: String,
    /// Transcript in order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Current phase of the guided flow
    #[serde(default)]
    pub current_phase: Phase,
    /// First save
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Latest save
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    /// Transcript length at the latest save
    #[serde(default)]
    pub message_count: usize,
}

impl ConversationRecord {
    /// Build a record from a transcript.
    pub fn new(id: impl Into<String>, messages: Vec<Message>, phase: Phase) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: derive_title(&messages),
            message_count: messages.len(),
            messages,
            current_phase: phase,
            created_at: now,
            last_modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_title_is_shortened_to_fifty() {
        let text = "a".repeat(80);
        let title = derive_title(&[Message::user(text)]);
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn title_skips_assistant_and_strips_symbols() {
        let messages = vec![
            Message::assistant("Welcome!"),
            Message::user("Tang dynasty #silk @road"),
        ];
        assert_eq!(derive_title(&messages), "Tang dynasty silk road");
    }

    #[test]
    fn symbol_only_title_falls_back() {
        assert_eq!(derive_title(&[Message::user("@@@")]), DEFAULT_TITLE);
    }
}
