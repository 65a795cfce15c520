//! Scripted media generator and recorder for pipeline tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use vignette_core::{GenerationResult, Scene};
use vignette_error::{
    BAD_OUTPUT_FAILURE_CODE, GenerationError, GenerationErrorKind, GeneratorResult,
    VignetteResult,
};
use vignette_interface::{ImageRequest, MediaGenerator, MediaRef, SceneRecorder, VideoRequest};

/// A single scripted response.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum MockResponse {
    /// Succeed with the given URL
    Success(String),
    /// Fail with the given error
    Error(GenerationErrorKind),
}

impl MockResponse {
    /// HTTP 429 from the provider.
    #[allow(dead_code)]
    pub fn rate_limited() -> Self {
        MockResponse::Error(GenerationErrorKind::Api {
            status_code: 429,
            message: "Too many requests".to_string(),
        })
    }

    /// Task failed with the bad-output failure code.
    #[allow(dead_code)]
    pub fn bad_output() -> Self {
        MockResponse::Error(GenerationErrorKind::TaskFailed {
            task_id: "task-bad".to_string(),
            failure_code: Some(BAD_OUTPUT_FAILURE_CODE.to_string()),
            message: "Output was unusable".to_string(),
        })
    }

    /// Task failed without a failure code.
    #[allow(dead_code)]
    pub fn failed(message: &str) -> Self {
        MockResponse::Error(GenerationErrorKind::TaskFailed {
            task_id: "task-failed".to_string(),
            failure_code: None,
            message: message.to_string(),
        })
    }
}

/// Media generator answering from per-endpoint scripts.
///
/// Once a script runs out, calls succeed with numbered URLs.
#[derive(Debug, Default)]
pub struct MockGenerator {
    image_script: Mutex<VecDeque<MockResponse>>,
    video_script: Mutex<VecDeque<MockResponse>>,
    image_requests: Mutex<Vec<ImageRequest>>,
    video_requests: Mutex<Vec<VideoRequest>>,
    supports_reference: bool,
}

impl MockGenerator {
    /// Create a mock where every call succeeds.
    pub fn new_success() -> Self {
        Self::default()
    }

    /// Create a mock with scripted image and video responses.
    pub fn new_scripted(images: Vec<MockResponse>, videos: Vec<MockResponse>) -> Self {
        Self {
            image_script: Mutex::new(images.into()),
            video_script: Mutex::new(videos.into()),
            ..Self::default()
        }
    }

    /// Advertise reference image support.
    #[allow(dead_code)]
    pub fn with_reference_support(mut self) -> Self {
        self.supports_reference = true;
        self
    }

    /// Number of image requests received.
    pub fn image_call_count(&self) -> usize {
        self.image_requests.lock().unwrap().len()
    }

    /// Number of video requests received.
    pub fn video_call_count(&self) -> usize {
        self.video_requests.lock().unwrap().len()
    }

    /// Image requests in the order received.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.image_requests.lock().unwrap().clone()
    }

    /// Video requests in the order received.
    pub fn video_requests(&self) -> Vec<VideoRequest> {
        self.video_requests.lock().unwrap().clone()
    }

    fn answer(
        script: &Mutex<VecDeque<MockResponse>>,
        endpoint: &str,
        call: usize,
    ) -> GeneratorResult<MediaRef> {
        let task_id = format!("{endpoint}-task-{call}");
        match script.lock().unwrap().pop_front() {
            Some(MockResponse::Error(kind)) => Err(GenerationError::new(kind)),
            Some(MockResponse::Success(url)) => Ok(MediaRef::new(task_id, url)),
            None => Ok(MediaRef::new(
                task_id,
                format!("https://cdn.example/{endpoint}/{call}"),
            )),
        }
    }
}

#[async_trait]
impl MediaGenerator for MockGenerator {
    async fn create_image(&self, request: &ImageRequest) -> GeneratorResult<MediaRef> {
        let call = {
            let mut requests = self.image_requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        Self::answer(&self.image_script, "image", call)
    }

    async fn create_video(&self, request: &VideoRequest) -> GeneratorResult<MediaRef> {
        let call = {
            let mut requests = self.video_requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        Self::answer(&self.video_script, "video", call)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn supports_reference_images(&self) -> bool {
        self.supports_reference
    }
}

/// Recorder keeping every callback in memory.
#[derive(Debug, Default)]
pub struct MockRecorder {
    /// Scenes handed to `begin_run`
    pub started: Mutex<Vec<Scene>>,
    /// Results handed to `record_scene`, in order
    pub recorded: Mutex<Vec<GenerationResult>>,
    /// Results handed to `finish_run`
    pub finished: Mutex<Option<Vec<GenerationResult>>>,
}

#[async_trait]
impl SceneRecorder for MockRecorder {
    async fn begin_run(&self, _persona_name: &str, scenes: &[Scene]) -> VignetteResult<()> {
        self.started.lock().unwrap().extend_from_slice(scenes);
        Ok(())
    }

    async fn record_scene(
        &self,
        _persona_name: &str,
        result: &GenerationResult,
    ) -> VignetteResult<()> {
        self.recorded.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn finish_run(
        &self,
        _persona_name: &str,
        results: &[GenerationResult],
    ) -> VignetteResult<()> {
        *self.finished.lock().unwrap() = Some(results.to_vec());
        Ok(())
    }
}
