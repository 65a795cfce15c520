//! Reply text through extraction, generation and history.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vignette::{
    GenerationError, GenerationErrorKind, GenerationPipeline, GeneratorResult, HistoryStore,
    ImageRequest, MediaGenerator, MediaRef, PersonaNameResolver, PersonaRecorder, PersonaStatus,
    ProgressEvent, SceneExtractor, SceneStatus, VideoRequest, VignetteConfig,
};

const REPLY: &str = "\
**Scene 1: The Harbor**
Visual Prompt: Ada, 30, dark curls, on a foggy quay, 1843, gas lamps
Context: Steamships had begun to cross the Atlantic in two weeks.

**Scene 2: The Notes**
Visual Prompt: Ada, 30, dark curls, writing by candlelight, papers everywhere
Context: Her notes on the Analytical Engine ran longer than the paper they annotated.

GENERATE_VISUALS: Ada Lovelace
";

/// Images always succeed; every video is rate limited.
struct ThrottledVideos {
    images: AtomicUsize,
    videos: AtomicUsize,
}

#[async_trait]
impl MediaGenerator for ThrottledVideos {
    async fn create_image(&self, _request: &ImageRequest) -> GeneratorResult<MediaRef> {
        let n = self.images.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MediaRef::new(
            format!("img-{n}"),
            format!("https://cdn.example/image/{n}"),
        ))
    }

    async fn create_video(&self, _request: &VideoRequest) -> GeneratorResult<MediaRef> {
        self.videos.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::new(GenerationErrorKind::RateLimited(
            "429 Too Many Requests".to_string(),
        )))
    }

    fn provider_name(&self) -> &'static str {
        "throttled"
    }
}

#[tokio::test]
async fn test_reply_to_persisted_persona() -> anyhow::Result<()> {
    let scenes = SceneExtractor::new().extract(REPLY);
    let persona = PersonaNameResolver::new().resolve(REPLY, &[]);
    assert_eq!(scenes.len(), 2);
    assert_eq!(persona, "Ada Lovelace");

    let generator = Arc::new(ThrottledVideos {
        images: AtomicUsize::new(0),
        videos: AtomicUsize::new(0),
    });
    let history = Arc::new(HistoryStore::in_memory());
    let pipeline = GenerationPipeline::new(generator.clone(), &VignetteConfig::default())
        .with_recorder(Arc::new(PersonaRecorder::new(history.clone(), "conv-1")));

    let events: Vec<ProgressEvent> = pipeline.run(scenes, persona.clone()).collect().await;
    let Some(ProgressEvent::Complete { results, summary, .. }) = events.last() else {
        panic!("run did not complete: {events:?}");
    };

    assert_eq!(generator.images.load(Ordering::SeqCst), 2);
    assert_eq!(generator.videos.load(Ordering::SeqCst), 1);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.video_fallbacks, 2);
    assert!(results.iter().all(|r| r.is_rate_limited));

    let record = history
        .persona("conv-1_Ada_Lovelace")
        .await?
        .ok_or_else(|| anyhow::anyhow!("persona not recorded"))?;
    assert_eq!(record.metadata.status, PersonaStatus::Complete);
    assert!(record.scenes.iter().all(|s| s.status == SceneStatus::Complete));
    assert_eq!(
        record.scenes[1].video_url.as_deref(),
        Some("https://cdn.example/image/2")
    );
    assert!(record.scenes.iter().all(|s| s.expires_at.is_none()));
    Ok(())
}

#[tokio::test]
async fn test_empty_run_marks_persona_complete() -> anyhow::Result<()> {
    let generator = Arc::new(ThrottledVideos {
        images: AtomicUsize::new(0),
        videos: AtomicUsize::new(0),
    });
    let history = Arc::new(HistoryStore::in_memory());
    let pipeline = GenerationPipeline::new(generator.clone(), &VignetteConfig::default())
        .with_recorder(Arc::new(PersonaRecorder::new(history.clone(), "conv-2")));

    let events: Vec<ProgressEvent> = pipeline.run(Vec::new(), "Hypatia".to_string()).collect().await;
    assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));
    assert_eq!(generator.images.load(Ordering::SeqCst), 0);

    let record = history
        .persona("conv-2_Hypatia")
        .await?
        .ok_or_else(|| anyhow::anyhow!("persona not recorded"))?;
    assert_eq!(record.metadata.status, PersonaStatus::Complete);
    Ok(())
}
