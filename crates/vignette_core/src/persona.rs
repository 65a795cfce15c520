//! Persisted persona records.

use crate::{GenerationResult, Scene, SceneStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static WHITESPACE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\s+").expect("Valid whitespace regex"));

/// Stable persona id: conversation id joined to the name with whitespace runs as `_`.
///
/// # Examples
///
/// ```
/// use vignette_core::persona_id;
///
/// assert_eq!(persona_id("conv42", "Mei  Lin"), "conv42_Mei_Lin");
/// ```
pub fn persona_id(conversation_id: &str, persona_name: &str) -> String {
    format!(
        "{}_{}",
        conversation_id,
        WHITESPACE.replace_all(persona_name, "_")
    )
}

/// Whether a persona's scenes are still being produced.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PersonaStatus {
    /// A generation run is in progress
    #[default]
    Generating,
    /// Every scene has resolved
    Complete,
}

/// Bookkeeping attached to a persona record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaMetadata {
    /// Run state
    #[serde(default)]
    pub status: PersonaStatus,
    /// Number of scenes in the run
    #[serde(default)]
    pub total_scenes: usize,
    /// Number of scenes that reached a terminal state
    #[serde(default)]
    pub completed_scenes: usize,
    /// When the last scene resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A persona and the media generated for it within one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRecord {
    /// `{conversation_id}_{name}` with whitespace replaced
    pub id: String,
    /// Owning conversation
    pub conversation_id: String,
    /// Display name
    #[serde(alias = "name")]
    pub persona_name: String,
    /// Per-scene results in scene order
    #[serde(default)]
    pub scenes: Vec<GenerationResult>,
    /// Run bookkeeping
    #[serde(default)]
    pub metadata: PersonaMetadata,
    /// When the record was first written
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersonaRecord {
    /// A fresh record with every scene pending.
    pub fn new(conversation_id: &str, persona_name: &str, scenes: &[Scene]) -> Self {
        Self::with_results(
            conversation_id,
            persona_name,
            scenes.iter().cloned().map(GenerationResult::pending).collect(),
        )
    }

    /// A record around already-built results.
    pub fn with_results(
        conversation_id: &str,
        persona_name: &str,
        scenes: Vec<GenerationResult>,
    ) -> Self {
        let mut record = Self {
            id: persona_id(conversation_id, persona_name),
            conversation_id: conversation_id.to_string(),
            persona_name: persona_name.to_string(),
            scenes,
            metadata: PersonaMetadata::default(),
            created_at: Utc::now(),
            last_updated: None,
        };
        record.refresh_metadata();
        record
    }

    /// Look up a scene by number.
    pub fn scene(&self, scene_number: u32) -> Option<&GenerationResult> {
        self.scenes
            .iter()
            .find(|s| s.scene.scene_number == scene_number)
    }

    /// Recompute counts and run status from the scene list.
    pub fn refresh_metadata(&mut self) {
        self.metadata.total_scenes = self.scenes.len();
        self.metadata.completed_scenes = self
            .scenes
            .iter()
            .filter(|s| s.status.is_terminal())
            .count();
        // An empty run has nothing left to do.
        if self.metadata.completed_scenes == self.metadata.total_scenes {
            if self.metadata.status != PersonaStatus::Complete {
                self.metadata.completed_at = Some(Utc::now());
            }
            self.metadata.status = PersonaStatus::Complete;
        } else {
            self.metadata.status = PersonaStatus::Generating;
            self.metadata.completed_at = None;
        }
    }

    /// Number of scenes whose media is still reachable.
    pub fn valid_videos_at(&self, now: DateTime<Utc>) -> usize {
        self.scenes
            .iter()
            .filter(|s| s.is_video_valid_at(now))
            .count()
    }

    /// Number of scenes whose media has expired.
    pub fn expired_videos_at(&self, now: DateTime<Utc>) -> usize {
        self.scenes
            .iter()
            .filter(|s| s.video_url.is_some() && !s.is_video_valid_at(now))
            .count()
    }

    /// Whether any scene still needs work.
    pub fn has_pending(&self) -> bool {
        self.scenes
            .iter()
            .any(|s| matches!(s.status, SceneStatus::Pending | SceneStatus::Generating))
    }
}
