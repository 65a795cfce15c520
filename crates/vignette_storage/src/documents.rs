//! Bulk export format and history statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vignette_core::{ConversationRecord, PersonaRecord, Settings};

/// Version string written into exports.
pub const EXPORT_VERSION: &str = "1.0";

/// Everything the history store holds, as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Conversations, newest first
    pub conversations: Vec<ConversationRecord>,
    /// Personas across all conversations
    pub personas: Vec<PersonaRecord>,
    /// Settings in effect at export time
    pub settings: Settings,
    /// When the export was taken
    pub exported_at: DateTime<Utc>,
    /// Format version
    pub version: String,
}

/// A document to import. Sections left out keep their current contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    /// Replacement conversations
    #[serde(default)]
    pub conversations: Option<Vec<ConversationRecord>>,
    /// Replacement personas
    #[serde(default)]
    pub personas: Option<Vec<PersonaRecord>>,
    /// Replacement settings
    #[serde(default)]
    pub settings: Option<Settings>,
    /// Format version of the source
    #[serde(default)]
    pub version: Option<String>,
}

impl From<ExportDocument> for ImportDocument {
    fn from(document: ExportDocument) -> Self {
        Self {
            conversations: Some(document.conversations),
            personas: Some(document.personas),
            settings: Some(document.settings),
            version: Some(document.version),
        }
    }
}

/// Counts over the stored history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    /// Stored conversations
    pub conversations: usize,
    /// Stored personas
    pub personas: usize,
    /// Messages across all conversations
    pub total_messages: usize,
    /// Scenes across all personas
    pub total_scenes: usize,
    /// Scenes whose media is still inside the validity window
    pub active_videos: usize,
    /// Scenes whose media has expired
    pub expired_videos: usize,
}
