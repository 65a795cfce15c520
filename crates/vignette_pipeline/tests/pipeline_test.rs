//! Generation pipeline tests against a scripted generator.

mod test_utils;

use futures_util::StreamExt;
use std::sync::Arc;
use test_utils::{MockGenerator, MockRecorder, MockResponse};
use vignette_core::{GenerationResult, Scene, SceneStatus};
use vignette_error::BAD_OUTPUT_FAILURE_CODE;
use vignette_pipeline::{GenerationPipeline, ProgressEvent};
use vignette_rate_limit::{PipelineConfigBuilder, VignetteConfig};

fn scenes(count: u32) -> Vec<Scene> {
    (1..=count)
        .map(|n| {
            Scene::new(
                n,
                format!("Scene Title {n}"),
                format!("Harbor at dawn, scene {n}, fog, gulls, lamps"),
                format!("Context for scene {n}"),
            )
        })
        .collect()
}

fn pipeline(generator: Arc<MockGenerator>) -> GenerationPipeline {
    GenerationPipeline::new(generator, &VignetteConfig::default())
}

async fn run(pipeline: &GenerationPipeline, scenes: Vec<Scene>) -> Vec<ProgressEvent> {
    pipeline.run(scenes, "Mei Lin").collect().await
}

fn final_results(events: &[ProgressEvent]) -> Vec<GenerationResult> {
    match events.last() {
        Some(ProgressEvent::Complete { results, .. }) => results.clone(),
        other => panic!("expected complete event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_all_scenes_succeed() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let events = run(&pipeline(generator.clone()), scenes(3)).await;

    let kinds: Vec<_> = events.iter().map(ProgressEvent::event_type).collect();
    assert_eq!(
        kinds,
        vec![
            "status",
            "progress",
            "scene_complete",
            "progress",
            "scene_complete",
            "progress",
            "scene_complete",
            "complete"
        ]
    );

    let results = final_results(&events);
    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.status, SceneStatus::Complete);
        assert!(!result.video_fallback);
        assert!(result.has_genuine_video());
        assert!(result.expires_at.is_some());
        assert!(result.generated_at.is_some());
    }
    assert_eq!(generator.image_call_count(), 3);
    assert_eq!(generator.video_call_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_status_and_progress_messages() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let events = run(&pipeline(generator), scenes(2)).await;

    match &events[0] {
        ProgressEvent::Status {
            message,
            total_scenes,
            current_scene,
        } => {
            assert_eq!(message, "Starting generation of 2 scenes for Mei Lin...");
            assert_eq!(*total_scenes, 2);
            assert_eq!(*current_scene, 0);
        }
        other => panic!("expected status, got {other:?}"),
    }
    match &events[1] {
        ProgressEvent::Progress {
            message,
            current_scene,
            ..
        } => {
            assert_eq!(message, "Generating Scene 1: Scene Title 1");
            assert_eq!(*current_scene, 1);
        }
        other => panic!("expected progress, got {other:?}"),
    }
    match events.last() {
        Some(ProgressEvent::Complete {
            message, summary, ..
        }) => {
            assert_eq!(message, "Generated 2 scenes for Mei Lin");
            assert_eq!(summary.successful, 2);
        }
        other => panic!("expected complete, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_scene_complete_events_in_order() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![
            MockResponse::Success("https://cdn.example/a.png".to_string()),
            MockResponse::failed("content moderated"),
        ],
        vec![],
    ));
    let events = run(&pipeline(generator), scenes(4)).await;

    let completed: Vec<(usize, u32)> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::SceneComplete {
                scene,
                current_scene,
                ..
            } => Some((*current_scene, scene.scene_number())),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
    Ok(())
}

#[tokio::test]
async fn test_video_rate_limit_short_circuits_run() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![],
        vec![MockResponse::rate_limited()],
    ));
    let events = run(&pipeline(generator.clone()), scenes(3)).await;
    let results = final_results(&events);

    let first = &results[0];
    assert_eq!(first.status, SceneStatus::Complete);
    assert!(first.video_fallback);
    assert!(first.is_rate_limited);
    assert_eq!(first.video_url, first.image_url);
    assert!(first.expires_at.is_none());

    for result in &results[1..] {
        assert_eq!(result.status, SceneStatus::Complete);
        assert!(result.video_fallback);
        assert_eq!(result.video_url, result.image_url);
    }

    assert_eq!(generator.image_call_count(), 3);
    assert_eq!(generator.video_call_count(), 1);

    let flagged: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Progress { rate_limited, .. } => Some(*rate_limited),
            _ => None,
        })
        .collect();
    assert_eq!(flagged, vec![false, true, true]);
    Ok(())
}

#[tokio::test]
async fn test_daily_limit_message_counts_as_rate_limit() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![],
        vec![MockResponse::Error(
            vignette_error::GenerationErrorKind::Api {
                status_code: 400,
                message: "You have exceeded your Daily Task Limit".to_string(),
            },
        )],
    ));
    let events = run(&pipeline(generator.clone()), scenes(2)).await;
    let results = final_results(&events);

    assert!(results[0].is_rate_limited);
    assert_eq!(generator.video_call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_image_rate_limit_fails_scene_without_retry() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![MockResponse::rate_limited()],
        vec![],
    ));
    let events = run(&pipeline(generator.clone()), scenes(2)).await;
    let results = final_results(&events);

    assert_eq!(results[0].status, SceneStatus::Failed);
    assert!(results[0].is_rate_limited);
    assert!(results[0].error.is_some());
    assert!(results[0].image_url.is_none());

    // Scene 2 still gets an image, but no video request.
    assert_eq!(results[1].status, SceneStatus::Complete);
    assert!(results[1].video_fallback);
    assert_eq!(generator.image_call_count(), 2);
    assert_eq!(generator.video_call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_bad_output_retries_once_with_simplified_prompt() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![MockResponse::bad_output()],
        vec![],
    ));
    let context = "c".repeat(180);
    let scene = Scene::new(
        1,
        "Market Day",
        "Crowded market, wooden stalls, fresh fish, rain clouds, 1850",
        context.clone(),
    );
    let events = run(&pipeline(generator.clone()), vec![scene]).await;
    let results = final_results(&events);

    let requests = generator.image_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].prompt(),
        "Crowded market, wooden stalls, fresh fish"
    );
    assert!(requests[1].prompt().split(',').count() <= 3);

    let videos = generator.video_requests();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].prompt(), &context[..100]);

    let result = &results[0];
    assert_eq!(result.status, SceneStatus::Complete);
    assert!(result.retried);
    assert_eq!(
        result.scene.visual_prompt,
        "Crowded market, wooden stalls, fresh fish"
    );
    Ok(())
}

#[tokio::test]
async fn test_bad_output_retry_failure_is_final() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![MockResponse::bad_output(), MockResponse::bad_output()],
        vec![],
    ));
    let events = run(&pipeline(generator.clone()), scenes(1)).await;
    let results = final_results(&events);

    assert_eq!(generator.image_call_count(), 2);
    assert_eq!(generator.video_call_count(), 0);
    assert_eq!(results[0].status, SceneStatus::Failed);
    assert_eq!(
        results[0].error_code.as_deref(),
        Some(BAD_OUTPUT_FAILURE_CODE)
    );
    assert!(results[0].retried);
    Ok(())
}

#[tokio::test]
async fn test_rate_limited_retry_keeps_simplified_prompt() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![MockResponse::bad_output(), MockResponse::rate_limited()],
        vec![],
    ));
    let scene = Scene::new(1, "Docks", "a, b, c, d, e", "Context");
    let events = run(&pipeline(generator.clone()), vec![scene]).await;
    let results = final_results(&events);

    let result = &results[0];
    assert_eq!(generator.image_call_count(), 2);
    assert_eq!(result.status, SceneStatus::Failed);
    assert!(result.is_rate_limited);
    assert!(result.retried);
    assert_eq!(result.scene.visual_prompt, "a, b, c");
    Ok(())
}

#[tokio::test]
async fn test_generic_failure_does_not_retry_or_abort() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![MockResponse::failed("content moderated")],
        vec![],
    ));
    let events = run(&pipeline(generator.clone()), scenes(2)).await;
    let results = final_results(&events);

    assert_eq!(results[0].status, SceneStatus::Failed);
    assert_eq!(results[0].error_code.as_deref(), Some("UNKNOWN"));
    assert!(
        results[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("content moderated"))
    );
    assert!(!results[0].retried);
    assert_eq!(results[1].status, SceneStatus::Complete);
    assert_eq!(generator.image_call_count(), 2);
    assert_eq!(generator.video_call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_video_failure_falls_back_to_image() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![],
        vec![MockResponse::failed("motion model unavailable")],
    ));
    let events = run(&pipeline(generator.clone()), scenes(2)).await;
    let results = final_results(&events);

    assert_eq!(results[0].status, SceneStatus::Complete);
    assert!(results[0].video_fallback);
    assert!(!results[0].is_rate_limited);
    assert!(results[0].video_error.is_some());
    // A generic video failure does not stop later videos.
    assert!(results[1].has_genuine_video());
    assert_eq!(generator.video_call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_long_prompt_is_truncated() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let scene = Scene::new(1, "Long", "x".repeat(1200), "ctx");
    run(&pipeline(generator.clone()), vec![scene]).await;

    let prompt = generator.image_requests()[0].prompt().clone();
    assert!(prompt.chars().count() <= 900);
    assert!(prompt.ends_with("..."));
    Ok(())
}

#[tokio::test]
async fn test_video_request_uses_image_and_context() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let scene = Scene::new(1, "Docks", "ships", "Fog rolls over the bay");
    run(&pipeline(generator.clone()), vec![scene]).await;

    let image = &generator.image_requests()[0];
    assert_eq!(image.ratio(), "1280:720");
    let video = &generator.video_requests()[0];
    assert_eq!(video.source_image(), "https://cdn.example/image/1");
    assert_eq!(video.prompt(), "Cinematic view: Fog rolls over the bay");
    assert_eq!(*video.duration_secs(), 5);
    Ok(())
}

#[tokio::test]
async fn test_blank_persona_is_rejected() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let events: Vec<_> = pipeline(generator.clone())
        .run(scenes(2), "   ")
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::Error { .. }));
    assert_eq!(generator.image_call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_reference_image_from_first_scene() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success().with_reference_support());
    let config = VignetteConfig::default().with_pipeline(
        PipelineConfigBuilder::default()
            .use_reference_image(true)
            .build()?,
    );
    let pipeline = GenerationPipeline::new(generator.clone(), &config);
    run(&pipeline, scenes(3)).await;

    let requests = generator.image_requests();
    assert!(requests[0].reference().is_none());
    assert_eq!(
        requests[1].reference().as_deref(),
        Some("https://cdn.example/image/1")
    );
    assert_eq!(
        requests[2].reference().as_deref(),
        Some("https://cdn.example/image/1")
    );
    Ok(())
}

#[tokio::test]
async fn test_reference_image_disabled_by_default() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success().with_reference_support());
    run(&pipeline(generator.clone()), scenes(2)).await;

    assert!(
        generator
            .image_requests()
            .iter()
            .all(|r| r.reference().is_none())
    );
    Ok(())
}

#[tokio::test]
async fn test_recorder_sees_every_scene() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let recorder = Arc::new(MockRecorder::default());
    let pipeline = pipeline(generator).with_recorder(recorder.clone());
    run(&pipeline, scenes(3)).await;

    assert_eq!(recorder.started.lock().unwrap().len(), 3);
    let recorded: Vec<u32> = recorder
        .recorded
        .lock()
        .unwrap()
        .iter()
        .map(GenerationResult::scene_number)
        .collect();
    assert_eq!(recorded, vec![1, 2, 3]);
    assert_eq!(
        recorder
            .finished
            .lock()
            .unwrap()
            .as_ref()
            .map(Vec::len),
        Some(3)
    );
    Ok(())
}

#[tokio::test]
async fn test_run_to_completion_returns_results() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_success());
    let results = pipeline(generator).run_to_completion(scenes(2), "Ada").await?;
    assert_eq!(results.len(), 2);

    let generator = Arc::new(MockGenerator::new_success());
    let err = pipeline(generator)
        .run_to_completion(scenes(2), "")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("persona name is blank"));
    Ok(())
}

#[tokio::test]
async fn test_each_run_starts_without_rate_limit() -> anyhow::Result<()> {
    let generator = Arc::new(MockGenerator::new_scripted(
        vec![],
        vec![MockResponse::rate_limited()],
    ));
    let pipeline = pipeline(generator.clone());
    run(&pipeline, scenes(2)).await;
    assert_eq!(generator.video_call_count(), 1);

    let events = run(&pipeline, scenes(2)).await;
    let results = final_results(&events);
    assert!(results.iter().all(GenerationResult::has_genuine_video));
    assert_eq!(generator.video_call_count(), 3);
    Ok(())
}
