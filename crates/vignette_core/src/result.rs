//! Per-scene generation results and the media validity window.

use crate::Scene;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a generated media reference stays reachable at the provider.
pub const VIDEO_VALIDITY_HOURS: i64 = 24;

/// The validity window as a duration.
pub fn validity_window() -> Duration {
    Duration::hours(VIDEO_VALIDITY_HOURS)
}

/// Lifecycle of a scene within a generation run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SceneStatus {
    /// Not yet attempted
    #[default]
    Pending,
    /// Requests in flight
    Generating,
    /// Media available (possibly image-only)
    Complete,
    /// No usable media
    Failed,
}

impl SceneStatus {
    /// Whether the scene has resolved one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SceneStatus::Complete | SceneStatus::Failed)
    }
}

/// A scene together with what the generation service produced for it.
///
/// `video_url` equals `image_url` when video generation was skipped or failed;
/// `video_fallback` records that case. `error` is present iff the scene failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// The scene this result belongs to
    #[serde(flatten)]
    pub scene: Scene,
    /// Generated still image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Generated clip, or the image when degraded
    #[serde(default)]
    pub video_url: Option<String>,
    /// Current lifecycle state
    #[serde(default)]
    pub status: SceneStatus,
    /// Failure message for failed scenes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider failure code for failed scenes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Why the video step degraded to the still image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_error: Option<String>,
    /// True iff `video_url == image_url`
    #[serde(default)]
    pub video_fallback: bool,
    /// The provider rate-limited this scene
    #[serde(default)]
    pub is_rate_limited: bool,
    /// Produced by the simplified-prompt retry
    #[serde(default)]
    pub retried: bool,
    /// When the record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When media finished generating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// When a genuine video stops being reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl GenerationResult {
    /// A result that has not been attempted yet.
    pub fn pending(scene: Scene) -> Self {
        Self {
            scene,
            image_url: None,
            video_url: None,
            status: SceneStatus::Pending,
            error: None,
            error_code: None,
            video_error: None,
            video_fallback: false,
            is_rate_limited: false,
            retried: false,
            created_at: Some(Utc::now()),
            generated_at: None,
            expires_at: None,
        }
    }

    /// Scene number shortcut.
    pub fn scene_number(&self) -> u32 {
        self.scene.scene_number
    }

    /// Whether the scene carries a real clip rather than the image fallback.
    pub fn has_genuine_video(&self) -> bool {
        self.video_url.is_some() && !self.video_fallback
    }

    /// Stamp the result as generated at `at`.
    ///
    /// `expires_at` is only set when a genuine video was produced.
    pub fn stamp_generated(&mut self, at: DateTime<Utc>) {
        self.generated_at = Some(at);
        self.expires_at = self.has_genuine_video().then(|| at + validity_window());
    }

    /// Validity check against the current clock.
    pub fn is_video_valid(&self) -> bool {
        self.is_video_valid_at(Utc::now())
    }

    /// Whether the media reference is still reachable at `now`.
    ///
    /// No video means invalid. Records without `expires_at` and `created_at`
    /// predate expiry tracking and count as valid. Otherwise the expiry is
    /// `expires_at`, falling back to `created_at` plus the validity window.
    pub fn is_video_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.video_url.is_none() {
            return false;
        }
        let expiry = match (self.expires_at, self.created_at) {
            (Some(expires_at), _) => expires_at,
            (None, Some(created_at)) => created_at + validity_window(),
            (None, None) => return true,
        };
        now < expiry
    }

    /// Apply a partial update, leaving unset fields untouched.
    pub fn apply(&mut self, update: &SceneUpdate) {
        if let Some(title) = &update.title {
            self.scene.title = title.clone();
        }
        if let Some(prompt) = &update.visual_prompt {
            self.scene.visual_prompt = prompt.clone();
        }
        if let Some(context) = &update.context {
            self.scene.context = context.clone();
        }
        if let Some(image_url) = &update.image_url {
            self.image_url = Some(image_url.clone());
        }
        if let Some(video_url) = &update.video_url {
            self.video_url = Some(video_url.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
        if let Some(code) = &update.error_code {
            self.error_code = Some(code.clone());
        }
        if let Some(video_error) = &update.video_error {
            self.video_error = Some(video_error.clone());
        }
        if let Some(fallback) = update.video_fallback {
            self.video_fallback = fallback;
        }
        if let Some(rate_limited) = update.is_rate_limited {
            self.is_rate_limited = rate_limited;
        }
        if let Some(retried) = update.retried {
            self.retried = retried;
        }
    }
}

/// Partial update for one persisted scene.
///
/// # Examples
///
/// ```
/// use vignette_core::{SceneStatus, SceneUpdate};
///
/// let update = SceneUpdate::default()
///     .with_image_url("https://cdn.example/1.png")
///     .with_status(SceneStatus::Generating);
/// assert_eq!(update.status, Some(SceneStatus::Generating));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct SceneUpdate {
    /// Replacement title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_prompt: Option<String>,
    /// Replacement context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// New image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// New video URL; setting it marks the scene complete and restarts the validity window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SceneStatus>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider failure code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Video degradation reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_error: Option<String>,
    /// Fallback flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_fallback: Option<bool>,
    /// Rate-limit flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rate_limited: Option<bool>,
    /// Retry flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retried: Option<bool>,
}

impl From<&GenerationResult> for SceneUpdate {
    fn from(result: &GenerationResult) -> Self {
        Self {
            title: Some(result.scene.title.clone()),
            visual_prompt: Some(result.scene.visual_prompt.clone()),
            context: Some(result.scene.context.clone()),
            image_url: result.image_url.clone(),
            video_url: result.video_url.clone(),
            status: Some(result.status),
            error: result.error.clone(),
            error_code: result.error_code.clone(),
            video_error: result.video_error.clone(),
            video_fallback: Some(result.video_fallback),
            is_rate_limited: Some(result.is_rate_limited),
            retried: Some(result.retried),
        }
    }
}
