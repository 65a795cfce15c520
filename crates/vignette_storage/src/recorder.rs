//! Persists pipeline progress into the history store.

use crate::HistoryStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use vignette_core::{GenerationResult, Scene, SceneUpdate, persona_id};
use vignette_error::VignetteResult;
use vignette_interface::SceneRecorder;

/// Writes a run's scenes under one conversation as they resolve.
///
/// The persona record is created with every scene pending when the run starts
/// and updated in place after each scene.
#[derive(Debug, Clone)]
pub struct PersonaRecorder {
    history: Arc<HistoryStore>,
    conversation_id: String,
}

impl PersonaRecorder {
    /// Record runs under `conversation_id`.
    pub fn new(history: Arc<HistoryStore>, conversation_id: impl Into<String>) -> Self {
        Self {
            history,
            conversation_id: conversation_id.into(),
        }
    }

    /// Conversation runs are recorded under.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

#[async_trait]
impl SceneRecorder for PersonaRecorder {
    async fn begin_run(&self, persona_name: &str, scenes: &[Scene]) -> VignetteResult<()> {
        let pending = scenes
            .iter()
            .cloned()
            .map(GenerationResult::pending)
            .collect();
        let record = self
            .history
            .save_persona(&self.conversation_id, persona_name, pending)
            .await?;
        debug!(persona_id = %record.id, "Recorded run start");
        Ok(())
    }

    async fn record_scene(
        &self,
        persona_name: &str,
        result: &GenerationResult,
    ) -> VignetteResult<()> {
        let id = persona_id(&self.conversation_id, persona_name);
        self.history
            .update_persona_scene(&id, result.scene_number(), &SceneUpdate::from(result))
            .await?;
        Ok(())
    }

    async fn finish_run(
        &self,
        persona_name: &str,
        results: &[GenerationResult],
    ) -> VignetteResult<()> {
        let record = self
            .history
            .save_persona(&self.conversation_id, persona_name, results.to_vec())
            .await?;
        debug!(
            persona_id = %record.id,
            status = %record.metadata.status,
            "Recorded run completion"
        );
        Ok(())
    }
}
