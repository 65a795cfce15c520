//! Sequential scene generation.
//!
//! Each scene gets an image, then a clip animated from that image. Scenes run one at
//! a time; a failing scene never stops its siblings. Once the provider signals a rate
//! limit, the rest of the run skips the video step and shows the still image instead.

use crate::{ProgressEvent, PromptSanitizer, RunContext, RunSummary};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use vignette_core::{GenerationResult, Scene, SceneStatus};
use vignette_error::{GenerationError, PipelineError, PipelineErrorKind, PipelineResult};
use vignette_interface::{ImageRequest, MediaGenerator, MediaRef, SceneRecorder, VideoRequest};
use vignette_rate_limit::VignetteConfig;

/// Failure code recorded when the provider gave none.
const UNKNOWN_FAILURE_CODE: &str = "UNKNOWN";

/// Which prompt a scene is being rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attempt {
    /// Sanitized scene prompt
    Primary {
        image_prompt: String,
        video_prompt: String,
    },
    /// Reduced prompt after the provider rejected the primary output
    Simplified {
        image_prompt: String,
        video_prompt: String,
    },
}

impl Attempt {
    fn prompts(&self) -> (&str, &str) {
        match self {
            Attempt::Primary {
                image_prompt,
                video_prompt,
            }
            | Attempt::Simplified {
                image_prompt,
                video_prompt,
            } => (image_prompt, video_prompt),
        }
    }

    fn is_retry(&self) -> bool {
        matches!(self, Attempt::Simplified { .. })
    }
}

/// What happened at the video step.
#[derive(Debug)]
enum VideoOutcome {
    /// A clip was produced
    Generated(MediaRef),
    /// Not attempted because the run is already rate-limited
    Skipped,
    /// The provider refused the request
    RateLimited(GenerationError),
    /// Any other failure
    Failed(GenerationError),
}

/// Drives scenes through the generation service and reports progress.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use std::sync::Arc;
/// use vignette_core::Scene;
/// use vignette_interface::MediaGenerator;
/// use vignette_pipeline::GenerationPipeline;
/// use vignette_rate_limit::VignetteConfig;
///
/// # async fn example(generator: Arc<dyn MediaGenerator>) {
/// let pipeline = GenerationPipeline::new(generator, &VignetteConfig::default());
/// let scenes = vec![Scene::new(1, "The Docks", "Steamships at dawn", "1906, San Francisco")];
/// let mut events = Box::pin(pipeline.run(scenes, "Mei Lin"));
/// while let Some(event) = events.next().await {
///     println!("{}", event.event_type());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct GenerationPipeline {
    generator: Arc<dyn MediaGenerator>,
    recorder: Option<Arc<dyn SceneRecorder>>,
    sanitizer: PromptSanitizer,
    ratio: String,
    video_duration_secs: u32,
    scene_delay: Duration,
    use_reference_image: bool,
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("provider", &self.generator.provider_name())
            .field("has_recorder", &self.recorder.is_some())
            .field("sanitizer", &self.sanitizer)
            .field("ratio", &self.ratio)
            .field("video_duration_secs", &self.video_duration_secs)
            .field("scene_delay", &self.scene_delay)
            .field("use_reference_image", &self.use_reference_image)
            .finish()
    }
}

impl GenerationPipeline {
    /// Create a pipeline over `generator` using the provider and pipeline settings.
    pub fn new(generator: Arc<dyn MediaGenerator>, config: &VignetteConfig) -> Self {
        let pipeline = config.pipeline();
        Self {
            generator,
            recorder: None,
            sanitizer: PromptSanitizer::from_config(pipeline),
            ratio: config.runway().ratio().clone(),
            video_duration_secs: *config.runway().video_duration_secs(),
            scene_delay: Duration::from_millis(*pipeline.scene_delay_ms()),
            use_reference_image: *pipeline.use_reference_image(),
        }
    }

    /// Write progress through `recorder` as scenes resolve.
    pub fn with_recorder(mut self, recorder: Arc<dyn SceneRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Prompt rules in effect.
    pub fn sanitizer(&self) -> &PromptSanitizer {
        &self.sanitizer
    }

    /// Generate every scene in order, yielding progress as it happens.
    ///
    /// The stream yields `status`, then `progress` and `scene_complete` for each
    /// scene, then `complete`. A blank persona name or a recorder that cannot start
    /// the run yields a single terminal `error` instead. Dropping the stream stops
    /// further scenes from being requested.
    pub fn run<P: Into<String>>(
        &self,
        scenes: Vec<Scene>,
        persona_name: P,
    ) -> impl Stream<Item = ProgressEvent> + Send + use<P> {
        let pipeline = self.clone();
        let persona = persona_name.into().trim().to_string();

        async_stream::stream! {
            if persona.is_empty() {
                let err = PipelineError::new(PipelineErrorKind::InvalidInput(
                    "persona name is blank".to_string(),
                ));
                error!(error = %err, "Rejecting generation run");
                yield ProgressEvent::Error {
                    message: "Generation failed".to_string(),
                    error: err.kind.to_string(),
                };
                return;
            }

            let total = scenes.len();
            info!(persona = %persona, total_scenes = total, "Starting generation run");
            yield ProgressEvent::Status {
                message: format!("Starting generation of {total} scenes for {persona}..."),
                total_scenes: total,
                current_scene: 0,
            };

            if let Some(recorder) = &pipeline.recorder {
                if let Err(e) = recorder.begin_run(&persona, &scenes).await {
                    let err = PipelineError::new(PipelineErrorKind::Recorder(e.to_string()));
                    error!(error = %err, "Could not record run start");
                    yield ProgressEvent::Error {
                        message: "Generation failed".to_string(),
                        error: err.kind.to_string(),
                    };
                    return;
                }
            }

            let mut ctx = RunContext::default();
            let mut results = Vec::with_capacity(total);

            for (index, scene) in scenes.into_iter().enumerate() {
                let current = index + 1;
                if index > 0 && !pipeline.scene_delay.is_zero() {
                    tokio::time::sleep(pipeline.scene_delay).await;
                }

                yield ProgressEvent::Progress {
                    message: format!("Generating Scene {}: {}", scene.scene_number, scene.title),
                    current_scene: current,
                    total_scenes: total,
                    scene_status: SceneStatus::Generating,
                    rate_limited: ctx.is_rate_limited(),
                };

                let (result, next) = pipeline.process_scene(scene, ctx).await;
                ctx = next;

                if let Some(recorder) = &pipeline.recorder {
                    if let Err(e) = recorder.record_scene(&persona, &result).await {
                        warn!(scene_number = result.scene_number(), error = %e, "Could not record scene");
                    }
                }

                yield ProgressEvent::SceneComplete {
                    scene: result.clone(),
                    current_scene: current,
                    total_scenes: total,
                };
                results.push(result);
            }

            if let Some(recorder) = &pipeline.recorder {
                if let Err(e) = recorder.finish_run(&persona, &results).await {
                    warn!(error = %e, "Could not record run completion");
                }
            }

            let summary = RunSummary::from_results(&results);
            info!(
                persona = %persona,
                successful = summary.successful,
                failed = summary.failed,
                rate_limited = summary.rate_limited,
                "Generation run finished"
            );
            yield ProgressEvent::Complete {
                message: format!("Generated {} scenes for {}", results.len(), persona),
                results,
                summary,
            };
        }
    }

    /// Run to the end and return the results.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineErrorKind::Aborted`] when the run ends with an `error` event.
    pub async fn run_to_completion(
        &self,
        scenes: Vec<Scene>,
        persona_name: impl Into<String>,
    ) -> PipelineResult<Vec<GenerationResult>> {
        let mut events = Box::pin(self.run(scenes, persona_name));
        while let Some(event) = events.next().await {
            match event {
                ProgressEvent::Complete { results, .. } => return Ok(results),
                ProgressEvent::Error { error, .. } => {
                    return Err(PipelineError::new(PipelineErrorKind::Aborted(error)));
                }
                _ => {}
            }
        }
        Err(PipelineError::new(PipelineErrorKind::Aborted(
            "event stream ended without completing".to_string(),
        )))
    }

    /// Resolve one scene, returning its result and the context for the next scene.
    #[instrument(
        skip(self, scene, ctx),
        fields(scene_number = scene.scene_number, rate_limited = ctx.is_rate_limited())
    )]
    async fn process_scene(
        &self,
        scene: Scene,
        mut ctx: RunContext,
    ) -> (GenerationResult, RunContext) {
        let mut result = GenerationResult::pending(scene.clone());
        let mut attempt = Attempt::Primary {
            image_prompt: self.sanitizer.sanitize(&scene),
            video_prompt: self.sanitizer.video_prompt(&scene),
        };

        loop {
            let (image_prompt, video_prompt) = attempt.prompts();
            match self.render_image(&scene, image_prompt, &ctx).await {
                Ok(image) => {
                    if scene.scene_number == 1 {
                        ctx.remember_reference(image.url());
                    }
                    let outcome = self.render_video(&image, video_prompt, &mut ctx).await;
                    if attempt.is_retry() {
                        result.scene.visual_prompt = image_prompt.to_string();
                        result.retried = true;
                    }
                    apply_outcome(&mut result, image, outcome);
                    result.stamp_generated(Utc::now());
                    info!(
                        video_fallback = result.video_fallback,
                        retried = result.retried,
                        "Scene complete"
                    );
                    return (result, ctx);
                }
                Err(err) if err.kind.is_rate_limit() => {
                    ctx.mark_rate_limited();
                    warn!(error = %err.kind, "Image generation rate limited");
                    result.status = SceneStatus::Failed;
                    result.error = Some(err.kind.to_string());
                    result.is_rate_limited = true;
                    if attempt.is_retry() {
                        result.scene.visual_prompt = image_prompt.to_string();
                        result.retried = true;
                    }
                    return (result, ctx);
                }
                Err(err) if err.kind.is_bad_output() && !attempt.is_retry() => {
                    let simplified = self.sanitizer.simplify(image_prompt);
                    warn!(
                        error = %err.kind,
                        simplified_prompt = %simplified,
                        "Provider rejected output, retrying with simplified prompt"
                    );
                    attempt = Attempt::Simplified {
                        image_prompt: simplified,
                        video_prompt: self.sanitizer.retry_video_prompt(&scene),
                    };
                }
                Err(err) => {
                    error!(error = %err.kind, retried = attempt.is_retry(), "Scene failed");
                    result.status = SceneStatus::Failed;
                    result.error = Some(err.kind.to_string());
                    result.error_code = Some(
                        err.kind
                            .failure_code()
                            .unwrap_or(UNKNOWN_FAILURE_CODE)
                            .to_string(),
                    );
                    if attempt.is_retry() {
                        result.scene.visual_prompt = image_prompt.to_string();
                        result.retried = true;
                    }
                    return (result, ctx);
                }
            }
        }
    }

    async fn render_image(
        &self,
        scene: &Scene,
        prompt: &str,
        ctx: &RunContext,
    ) -> Result<MediaRef, GenerationError> {
        let reference = ctx
            .reference_image()
            .filter(|_| {
                self.use_reference_image
                    && scene.scene_number != 1
                    && self.generator.supports_reference_images()
            })
            .map(str::to_string);
        debug!(
            prompt_chars = prompt.chars().count(),
            with_reference = reference.is_some(),
            "Requesting image"
        );
        let request = ImageRequest::new(prompt.to_string(), self.ratio.clone(), reference);
        self.generator.create_image(&request).await
    }

    async fn render_video(
        &self,
        image: &MediaRef,
        prompt: &str,
        ctx: &mut RunContext,
    ) -> VideoOutcome {
        if ctx.is_rate_limited() {
            debug!("Skipping video, run is rate limited");
            return VideoOutcome::Skipped;
        }
        let request = VideoRequest::new(
            image.url().clone(),
            prompt.to_string(),
            self.ratio.clone(),
            self.video_duration_secs,
        );
        match self.generator.create_video(&request).await {
            Ok(video) => VideoOutcome::Generated(video),
            Err(err) if err.kind.is_rate_limit() => {
                ctx.mark_rate_limited();
                VideoOutcome::RateLimited(err)
            }
            Err(err) => {
                warn!(error = %err.kind, "Video generation failed, falling back to image");
                VideoOutcome::Failed(err)
            }
        }
    }
}

fn apply_outcome(result: &mut GenerationResult, image: MediaRef, outcome: VideoOutcome) {
    let image_url = image.into_url();
    result.status = SceneStatus::Complete;
    match outcome {
        VideoOutcome::Generated(video) => {
            result.video_url = Some(video.into_url());
            result.video_fallback = false;
        }
        VideoOutcome::Skipped => {
            result.video_url = Some(image_url.clone());
            result.video_fallback = true;
            result.is_rate_limited = true;
            result.video_error =
                Some("Video skipped: rate limit reached earlier in this run".to_string());
        }
        VideoOutcome::RateLimited(err) => {
            result.video_url = Some(image_url.clone());
            result.video_fallback = true;
            result.is_rate_limited = true;
            result.video_error = Some(err.kind.to_string());
        }
        VideoOutcome::Failed(err) => {
            result.video_url = Some(image_url.clone());
            result.video_fallback = true;
            result.video_error = Some(err.kind.to_string());
        }
    }
    result.image_url = Some(image_url);
}
