//! Traits at the generation and persistence seams.

use crate::{ImageRequest, MediaRef, VideoRequest};
use async_trait::async_trait;
use vignette_core::{GenerationResult, Scene};
use vignette_error::{GeneratorResult, VignetteResult};

/// Image/video generation service.
///
/// Both calls run a provider task to completion before returning. Errors keep
/// rate limits, bad-output failures and generic failures distinguishable through
/// [`vignette_error::GenerationErrorKind`].
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    /// Render a still image.
    async fn create_image(&self, request: &ImageRequest) -> GeneratorResult<MediaRef>;

    /// Animate an image into a short clip.
    async fn create_video(&self, request: &VideoRequest) -> GeneratorResult<MediaRef>;

    /// Provider name (e.g., "runway").
    fn provider_name(&self) -> &'static str;

    /// Whether image requests accept a style reference.
    fn supports_reference_images(&self) -> bool {
        false
    }
}

/// Sink receiving pipeline progress so it can be persisted as scenes resolve.
#[async_trait]
pub trait SceneRecorder: Send + Sync {
    /// Called once before the first scene with every scene pending.
    async fn begin_run(&self, persona_name: &str, scenes: &[Scene]) -> VignetteResult<()>;

    /// Called after each scene resolves.
    async fn record_scene(&self, persona_name: &str, result: &GenerationResult)
    -> VignetteResult<()>;

    /// Called once after the last scene.
    async fn finish_run(
        &self,
        persona_name: &str,
        results: &[GenerationResult],
    ) -> VignetteResult<()>;
}
