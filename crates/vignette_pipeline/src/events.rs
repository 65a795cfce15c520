//! Progress events emitted while a run is in flight.

use serde::{Deserialize, Serialize};
use vignette_core::{GenerationResult, SceneStatus};
use vignette_error::JsonError;

/// Tallies over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Scenes attempted
    pub total: usize,
    /// Scenes that ended `complete`
    pub successful: usize,
    /// Scenes that ended `failed`
    pub failed: usize,
    /// Scenes the provider rate-limited
    pub rate_limited: usize,
    /// Scenes showing the still image instead of a clip
    pub video_fallbacks: usize,
    /// Scenes produced by the simplified-prompt retry
    pub retried: usize,
}

impl RunSummary {
    /// Count outcomes across `results`.
    pub fn from_results(results: &[GenerationResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    SceneStatus::Complete => summary.successful += 1,
                    SceneStatus::Failed => summary.failed += 1,
                    SceneStatus::Pending | SceneStatus::Generating => {}
                }
                summary.rate_limited += usize::from(result.is_rate_limited);
                summary.video_fallbacks += usize::from(result.video_fallback);
                summary.retried += usize::from(result.retried);
                summary
            },
        )
    }
}

/// One step of run progress.
///
/// Serialized as a JSON object tagged by `type`:
///
/// ```
/// use vignette_pipeline::ProgressEvent;
///
/// let event = ProgressEvent::Status {
///     message: "Starting generation of 3 scenes for Ada...".to_string(),
///     total_scenes: 3,
///     current_scene: 0,
/// };
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["type"], "status");
/// assert_eq!(json["totalScenes"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProgressEvent {
    /// Run accepted
    Status {
        /// Human-readable status line
        message: String,
        /// Scenes in the run
        total_scenes: usize,
        /// Always zero
        current_scene: usize,
    },
    /// A scene is about to be generated
    Progress {
        /// `"Generating Scene N: Title"`
        message: String,
        /// 1-based position in the run
        current_scene: usize,
        /// Scenes in the run
        total_scenes: usize,
        /// State of the scene being reported
        scene_status: SceneStatus,
        /// Whether video generation is already being skipped
        rate_limited: bool,
    },
    /// A scene resolved
    SceneComplete {
        /// The resolved scene
        scene: GenerationResult,
        /// 1-based position in the run
        current_scene: usize,
        /// Scenes in the run
        total_scenes: usize,
    },
    /// Every scene resolved
    Complete {
        /// Human-readable summary line
        message: String,
        /// Results in scene order
        results: Vec<GenerationResult>,
        /// Outcome counts
        summary: RunSummary,
    },
    /// The run aborted
    Error {
        /// Human-readable failure line
        message: String,
        /// Underlying error
        error: String,
    },
}

impl ProgressEvent {
    /// The `type` tag this event serializes with.
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::Status { .. } => "status",
            ProgressEvent::Progress { .. } => "progress",
            ProgressEvent::SceneComplete { .. } => "scene_complete",
            ProgressEvent::Complete { .. } => "complete",
            ProgressEvent::Error { .. } => "error",
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Complete { .. } | ProgressEvent::Error { .. }
        )
    }

    /// Frame the event for a server-sent events stream.
    ///
    /// ```
    /// use vignette_pipeline::ProgressEvent;
    ///
    /// let frame = ProgressEvent::Error {
    ///     message: "Generation failed".to_string(),
    ///     error: "boom".to_string(),
    /// }
    /// .to_sse_frame()
    /// .unwrap();
    /// assert!(frame.starts_with("data: {\"type\":\"error\""));
    /// assert!(frame.ends_with("\n\n"));
    /// ```
    pub fn to_sse_frame(&self) -> Result<String, JsonError> {
        let json = serde_json::to_string(self).map_err(|e| JsonError::new(e.to_string()))?;
        Ok(format!("data: {json}\n\n"))
    }
}
