//! Scene generation command handler.

use super::parse::read_reply;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;
use vignette::{
    GenerationPipeline, HistoryStore, Message, PersonaNameResolver, PersonaRecorder,
    Phase, PipelineError, PipelineErrorKind, ProgressEvent, RunwayClient, SceneExtractor,
    VignetteConfig, VignetteResult,
};

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    persona: Option<String>,
    conversation: Option<String>,
    sse: bool,
}

impl GenerateOptions {
    /// Create generation options.
    ///
    /// # Arguments
    ///
    /// * `persona` - Persona name; inferred from the reply when `None`
    /// * `conversation` - Conversation to record under; created when `None`
    /// * `sse` - Print events as server-sent event frames
    pub fn new(persona: Option<String>, conversation: Option<String>, sse: bool) -> Self {
        Self {
            persona,
            conversation,
            sse,
        }
    }
}

/// Run the pipeline over every scene in a reply file.
pub async fn generate_scenes(
    path: &Path,
    options: GenerateOptions,
    config: &VignetteConfig,
    data_dir: &Path,
) -> VignetteResult<()> {
    let text = read_reply(path).await?;
    let scenes = SceneExtractor::new().extract(&text);
    if scenes.is_empty() {
        eprintln!("No scenes found in {}", path.display());
        return Ok(());
    }

    let history = Arc::new(HistoryStore::open(data_dir, config.storage())?);
    let (conversation_id, messages) =
        prepare_conversation(&history, options.conversation, &text).await?;
    let persona = options
        .persona
        .unwrap_or_else(|| PersonaNameResolver::new().resolve(&text, &messages));

    let client = RunwayClient::new(config.runway().clone())?;
    let recorder = PersonaRecorder::new(history.clone(), conversation_id.clone());
    let pipeline =
        GenerationPipeline::new(Arc::new(client), config).with_recorder(Arc::new(recorder));

    tracing::info!(
        conversation = %conversation_id,
        persona = %persona,
        scenes = scenes.len(),
        "Starting generation"
    );

    let mut events = Box::pin(pipeline.run(scenes, persona));
    let mut aborted = None;
    while let Some(event) = events.next().await {
        if options.sse {
            print!("{}", event.to_sse_frame()?);
        } else {
            print_event(&event);
        }
        if let ProgressEvent::Error { error, .. } = event {
            aborted = Some(error);
        }
    }

    match aborted {
        Some(error) => Err(PipelineError::new(PipelineErrorKind::Aborted(error)).into()),
        None => Ok(()),
    }
}

/// Make sure the conversation exists and is in the visualization phase.
///
/// Returns the conversation id and its stored messages.
async fn prepare_conversation(
    history: &HistoryStore,
    requested: Option<String>,
    reply: &str,
) -> VignetteResult<(String, Vec<Message>)> {
    let id = requested.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let messages = match history.conversation(&id).await? {
        Some(existing) => existing.messages,
        None => vec![Message::assistant(reply)],
    };
    history
        .save_conversation(&id, messages.clone(), Phase::Visualization)
        .await?;
    Ok((id, messages))
}

fn print_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::Status { message, .. } => println!("{}", message),
        ProgressEvent::Progress {
            message,
            rate_limited,
            ..
        } => {
            if *rate_limited {
                println!("  {} (video skipped: rate limited)", message);
            } else {
                println!("  {}", message);
            }
        }
        ProgressEvent::SceneComplete {
            scene,
            current_scene,
            total_scenes,
        } => {
            println!(
                "  [{}/{}] {}: {}",
                current_scene, total_scenes, scene.scene.title, scene.status
            );
            if let Some(url) = &scene.video_url {
                let label = if scene.video_fallback { "image" } else { "video" };
                println!("    {}: {}", label, url);
            }
            if let Some(reason) = scene.error.as_ref().or(scene.video_error.as_ref()) {
                println!("    note: {}", reason);
            }
        }
        ProgressEvent::Complete {
            message, summary, ..
        } => {
            println!("{}", message);
            println!(
                "  {} complete, {} failed, {} image fallbacks, {} rate limited, {} retried",
                summary.successful,
                summary.failed,
                summary.video_fallbacks,
                summary.rate_limited,
                summary.retried
            );
        }
        ProgressEvent::Error { message, error } => {
            eprintln!("{}: {}", message, error);
        }
    }
}
