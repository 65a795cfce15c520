//! Scenes extracted from assistant replies.

use serde::{Deserialize, Serialize};

/// One unit of narrative plus rendering instruction.
///
/// `scene_number` is 1-based and unique within one extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Position of the scene in the narrative
    pub scene_number: u32,
    /// Scene heading
    pub title: String,
    /// Rendering instruction for the image model
    pub visual_prompt: String,
    /// Narrative text accompanying the scene
    pub context: String,
}

impl Scene {
    /// Create a scene.
    pub fn new(
        scene_number: u32,
        title: impl Into<String>,
        visual_prompt: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            title: title.into(),
            visual_prompt: visual_prompt.into(),
            context: context.into(),
        }
    }
}
