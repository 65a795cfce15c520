//! Runway REST client.
//!
//! Both generation calls submit a task and poll it until it settles. Submissions are
//! paced on the client side and never retried: a refused submission is reported as-is
//! so the pipeline can react to rate limits. Status polls retry transient failures
//! with exponential backoff.

use super::dto::{
    ImageToVideoRequest, ReferenceImage, TaskCreated, TaskOutcome, TaskResponse,
    TextToImageRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use vignette_error::{GenerationError, GenerationErrorKind, GeneratorResult, RetryableError};
use vignette_interface::{ImageRequest, MediaGenerator, MediaRef, VideoRequest};
use vignette_rate_limit::{RateLimitDetector, RequestPacer, RunwayConfig};

/// Environment variable holding the API secret.
pub const API_KEY_ENV: &str = "RUNWAYML_API_SECRET";

/// Older variable name, read when [`API_KEY_ENV`] is unset.
pub const FALLBACK_API_KEY_ENV: &str = "RUNWAY_API_KEY";

/// Tag attached to the style reference image.
const REFERENCE_TAG: &str = "style";

/// Runway image and video generation client.
#[derive(Clone)]
pub struct RunwayClient {
    client: Client,
    api_key: String,
    config: RunwayConfig,
    pacer: RequestPacer,
    detector: RateLimitDetector,
}

impl std::fmt::Debug for RunwayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunwayClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .finish()
    }
}

impl RunwayClient {
    /// Creates a client reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::MissingApiKey`] if neither `RUNWAYML_API_SECRET`
    /// nor `RUNWAY_API_KEY` is set.
    #[instrument(skip_all)]
    pub fn new(config: RunwayConfig) -> GeneratorResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .or_else(|_| std::env::var(FALLBACK_API_KEY_ENV))
            .map_err(|_| GenerationError::new(GenerationErrorKind::MissingApiKey))?;
        Ok(Self::with_api_key(api_key, config))
    }

    /// Creates a client with a specific API key.
    #[instrument(skip_all, fields(base_url = %config.base_url()))]
    pub fn with_api_key(api_key: impl Into<String>, config: RunwayConfig) -> Self {
        info!(
            image_model = %config.image_model(),
            video_model = %config.video_model(),
            "Creating Runway client"
        );
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            pacer: RequestPacer::new(*config.requests_per_minute()),
            detector: RateLimitDetector::new(),
            config,
        }
    }

    /// Provider settings in use.
    pub fn config(&self) -> &RunwayConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url().trim_end_matches('/'), path)
    }

    /// Submit a task and return its id.
    #[instrument(skip(self, body))]
    async fn submit<B: Serialize + Sync>(&self, path: &str, body: &B) -> GeneratorResult<String> {
        self.pacer.acquire().await;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", self.config.api_version())
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Transport(e.to_string())))?;

        let created: TaskCreated = self.read_json(response).await?;
        debug!(task_id = %created.id(), "Task submitted");
        Ok(created.id().clone())
    }

    /// Fetch a task's state once.
    async fn fetch_task(&self, task_id: &str) -> GeneratorResult<TaskResponse> {
        let response = self
            .client
            .get(self.url(&format!("tasks/{task_id}")))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", self.config.api_version())
            .send()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Transport(e.to_string())))?;
        self.read_json(response).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> GeneratorResult<T> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Transport(e.to_string())))?;

        if !status.is_success() {
            return Err(GenerationError::new(
                self.detector.classify(status, &headers, &body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            GenerationError::new(GenerationErrorKind::UnexpectedResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }

    /// Fetch a task's state, retrying transient failures.
    async fn fetch_task_with_retry(&self, task_id: &str) -> GeneratorResult<TaskResponse> {
        retry_transient(task_id, || self.fetch_task(task_id)).await
    }

    /// Poll a task until it succeeds, fails, or exhausts the polling budget.
    #[instrument(skip(self), fields(max_polls = self.config.max_polls()))]
    pub async fn wait_for_task(&self, task_id: &str) -> GeneratorResult<MediaRef> {
        let interval = Duration::from_millis(*self.config.poll_interval_ms());
        let max_polls = *self.config.max_polls();

        for poll in 1..=max_polls {
            tokio::time::sleep(interval).await;
            let task = self.fetch_task_with_retry(task_id).await?;
            match task.outcome() {
                TaskOutcome::InProgress => {
                    debug!(poll, status = ?task.status(), progress = ?task.progress(), "Task pending");
                }
                TaskOutcome::Ready(media) => {
                    info!(poll, "Task succeeded");
                    return Ok(media);
                }
                TaskOutcome::Failed(kind) => {
                    warn!(error = %kind, "Task did not succeed");
                    return Err(GenerationError::new(kind));
                }
            }
        }

        Err(GenerationError::new(GenerationErrorKind::Timeout {
            task_id: task_id.to_string(),
            polls: max_polls,
        }))
    }

    fn image_body(&self, request: &ImageRequest) -> TextToImageRequest {
        TextToImageRequest::new(
            self.config.image_model().clone(),
            request.ratio().clone(),
            request.prompt().clone(),
            request
                .reference()
                .iter()
                .map(|uri| ReferenceImage::new(uri.clone(), REFERENCE_TAG))
                .collect(),
        )
    }

    fn video_body(&self, request: &VideoRequest) -> ImageToVideoRequest {
        ImageToVideoRequest::new(
            self.config.video_model().clone(),
            request.source_image().clone(),
            request.prompt().clone(),
            request.ratio().clone(),
            *request.duration_secs(),
        )
    }
}

#[async_trait]
impl MediaGenerator for RunwayClient {
    #[instrument(skip(self, request), fields(model = %self.config.image_model()))]
    async fn create_image(&self, request: &ImageRequest) -> GeneratorResult<MediaRef> {
        let task_id = self.submit("text_to_image", &self.image_body(request)).await?;
        self.wait_for_task(&task_id).await
    }

    #[instrument(skip(self, request), fields(model = %self.config.video_model()))]
    async fn create_video(&self, request: &VideoRequest) -> GeneratorResult<MediaRef> {
        let task_id = self.submit("image_to_video", &self.video_body(request)).await?;
        self.wait_for_task(&task_id).await
    }

    fn provider_name(&self) -> &'static str {
        "runway"
    }

    fn supports_reference_images(&self) -> bool {
        true
    }
}

/// Run `operation`, retrying while it fails with a retryable error.
///
/// The first failure picks the backoff schedule through
/// [`RetryableError::retry_strategy_params`].
async fn retry_transient<T, E, F, Fut>(label: &str, mut operation: F) -> Result<T, E>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};

    // Try once to pick an error-specific strategy
    let (initial_ms, max_retries, max_delay_secs) = match operation().await {
        Ok(value) => return Ok(value),
        Err(e) if !e.is_retryable() => return Err(e),
        Err(e) => {
            let params = e.retry_strategy_params();
            warn!(
                label,
                error = %e,
                initial_backoff_ms = params.0,
                max_retries = params.1,
                "Request failed, will retry"
            );
            params
        }
    };

    let retry_strategy = ExponentialBackoff::from_millis(initial_ms)
        .factor(2)
        .max_delay(Duration::from_secs(max_delay_secs))
        .map(jitter)
        .take(max_retries);

    Retry::spawn(retry_strategy, || {
        let attempt = operation();
        async move {
            match attempt.await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(label, error = %e, "Request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        }
    })
    .await
}
