//! Trimming conversation history to the language model's context budget.

use derive_getters::Getters;
use tracing::{debug, instrument};
use crate::CURATOR_PROMPT;
use vignette_core::Message;
use vignette_rate_limit::ChatConfig;

/// Keeps the system prompt plus as many of the most recent turns as fit a token budget.
///
/// Tokens are estimated from character counts.
///
/// # Examples
///
/// ```
/// use vignette_core::Message;
/// use vignette_narrative::ContextWindow;
///
/// let window = ContextWindow::new(10, 4);
/// let history = vec![Message::user("x".repeat(40)), Message::user("recent")];
/// let fitted = window.fit("system", &history);
/// assert_eq!(fitted.len(), 2);
/// assert_eq!(fitted[1].content, "recent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ContextWindow {
    max_tokens: usize,
    chars_per_token: usize,
}

impl ContextWindow {
    /// Create a window; a zero `chars_per_token` is treated as one.
    pub fn new(max_tokens: usize, chars_per_token: usize) -> Self {
        Self {
            max_tokens,
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Build from configuration.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(*config.max_context_tokens(), *config.chars_per_token())
    }

    /// Rough token count of `text`.
    pub fn estimate_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }

    /// System prompt followed by the newest messages that fit, in original order.
    ///
    /// Walks history from newest to oldest and stops at the first message that would
    /// overflow the budget, so the kept turns are always a contiguous recent suffix.
    #[instrument(skip(self, system_prompt, history), fields(history_len = history.len()))]
    pub fn fit(&self, system_prompt: &str, history: &[Message]) -> Vec<Message> {
        let mut used = self.estimate_tokens(system_prompt);
        let mut kept = 0;
        for message in history.iter().rev() {
            let cost = self.estimate_tokens(&message.content);
            if used + cost > self.max_tokens {
                break;
            }
            used += cost;
            kept += 1;
        }
        debug!(kept, dropped = history.len() - kept, tokens = used, "Fitted context window");

        std::iter::once(Message::system(system_prompt))
            .chain(history[history.len() - kept..].iter().cloned())
            .collect()
    }

    /// [`Self::fit`] with the default curator instructions as the system prompt.
    pub fn fit_curated(&self, history: &[Message]) -> Vec<Message> {
        self.fit(CURATOR_PROMPT, history)
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}
