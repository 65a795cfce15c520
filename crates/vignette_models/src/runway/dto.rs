//! Runway API data transfer objects.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use vignette_error::GenerationErrorKind;
use vignette_interface::MediaRef;

/// Style reference attached to a text-to-image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ReferenceImage {
    /// Image URL
    uri: String,
    /// Tag the prompt can refer to
    tag: String,
}

impl ReferenceImage {
    /// Create a reference image.
    pub fn new(uri: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            tag: tag.into(),
        }
    }
}

/// Body of `POST /text_to_image`.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters, derive_new::new,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct TextToImageRequest {
    /// Image model
    model: String,
    /// Output size, `W:H`
    ratio: String,
    /// Rendering prompt
    prompt_text: String,
    /// Style references
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    reference_images: Vec<ReferenceImage>,
}

impl TextToImageRequest {
    /// Creates a new builder for `TextToImageRequest`.
    pub fn builder() -> TextToImageRequestBuilder {
        TextToImageRequestBuilder::default()
    }
}

/// Body of `POST /image_to_video`.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters, derive_new::new,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct ImageToVideoRequest {
    /// Video model
    model: String,
    /// First frame
    prompt_image: String,
    /// Motion prompt
    prompt_text: String,
    /// Output size, `W:H`
    ratio: String,
    /// Clip length in seconds
    duration: u32,
}

impl ImageToVideoRequest {
    /// Creates a new builder for `ImageToVideoRequest`.
    pub fn builder() -> ImageToVideoRequestBuilder {
        ImageToVideoRequestBuilder::default()
    }
}

/// Response to a task submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TaskCreated {
    /// Task id to poll
    id: String,
}

/// Provider-side task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Queued
    Pending,
    /// Queued behind the account's concurrency limit
    Throttled,
    /// Rendering
    Running,
    /// Output available
    Succeeded,
    /// Rendering failed
    Failed,
    /// Cancelled or deleted
    Cancelled,
    /// Any state this client does not know
    #[serde(other)]
    Unknown,
}

/// Body of `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task id
    id: String,
    /// Current state
    status: TaskStatus,
    /// Output URLs, first one is the media
    #[serde(default)]
    output: Vec<String>,
    /// Failure reason
    #[serde(default)]
    failure: Option<String>,
    /// Machine-readable failure code
    #[serde(default)]
    failure_code: Option<String>,
    /// Completion fraction while running
    #[serde(default)]
    progress: Option<f64>,
}

/// What one poll of a task tells the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Keep polling
    InProgress,
    /// Finished with media
    Ready(MediaRef),
    /// Finished without media
    Failed(GenerationErrorKind),
}

impl TaskResponse {
    /// Interpret the task state.
    pub fn outcome(&self) -> TaskOutcome {
        match self.status {
            TaskStatus::Succeeded => match self.output.first() {
                Some(url) => TaskOutcome::Ready(MediaRef::new(self.id.clone(), url.clone())),
                None => TaskOutcome::Failed(GenerationErrorKind::MissingOutput(self.id.clone())),
            },
            TaskStatus::Failed => TaskOutcome::Failed(GenerationErrorKind::TaskFailed {
                task_id: self.id.clone(),
                failure_code: self.failure_code.clone(),
                message: self
                    .failure
                    .clone()
                    .unwrap_or_else(|| "Task failed".to_string()),
            }),
            TaskStatus::Cancelled => {
                TaskOutcome::Failed(GenerationErrorKind::TaskCancelled(self.id.clone()))
            }
            TaskStatus::Pending
            | TaskStatus::Throttled
            | TaskStatus::Running
            | TaskStatus::Unknown => TaskOutcome::InProgress,
        }
    }
}
