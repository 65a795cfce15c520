//! User-adjustable history settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_max_conversations() -> usize {
    50
}

fn default_max_personas() -> usize {
    100
}

/// Persisted preferences for the history store.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_")]
pub struct Settings {
    /// Save transcripts after every turn
    #[serde(default = "default_true")]
    auto_save: bool,
    /// Conversation cap before eviction
    #[serde(default = "default_max_conversations")]
    max_conversations: usize,
    /// Persona cap before eviction
    #[serde(default = "default_max_personas")]
    max_personas: usize,
    /// Offer to reopen the active conversation on start
    #[serde(default = "default_true")]
    auto_restore: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_save: default_true(),
            max_conversations: default_max_conversations(),
            max_personas: default_max_personas(),
            auto_restore: default_true(),
        }
    }
}

/// Partial settings update; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New auto-save flag
    #[serde(default)]
    pub auto_save: Option<bool>,
    /// New conversation cap
    #[serde(default)]
    pub max_conversations: Option<usize>,
    /// New persona cap
    #[serde(default)]
    pub max_personas: Option<usize>,
    /// New auto-restore flag
    #[serde(default)]
    pub auto_restore: Option<bool>,
}

impl Settings {
    /// Merge a patch into these settings.
    pub fn merged(self, patch: &SettingsPatch) -> Self {
        Self {
            auto_save: patch.auto_save.unwrap_or(self.auto_save),
            max_conversations: patch.max_conversations.unwrap_or(self.max_conversations),
            max_personas: patch.max_personas.unwrap_or(self.max_personas),
            auto_restore: patch.auto_restore.unwrap_or(self.auto_restore),
        }
    }
}
