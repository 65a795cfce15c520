//! Reply parsing command handler.

use serde::Serialize;
use std::path::Path;
use vignette::{
    JsonError, PersonaNameResolver, Scene, SceneExtractor, StorageError, StorageErrorKind,
    VignetteResult,
};

/// What the parser found in a reply.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsedReply {
    persona_name: String,
    scenes: Vec<Scene>,
}

/// Read a reply from disk.
pub(crate) async fn read_reply(path: &Path) -> VignetteResult<String> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Read(format!("{}: {}", path.display(), e)))
    })?;
    Ok(text)
}

/// Print the scenes and persona name found in a reply file.
pub async fn parse_reply(path: &Path) -> VignetteResult<()> {
    let text = read_reply(path).await?;
    let parsed = ParsedReply {
        persona_name: PersonaNameResolver::new().resolve(&text, &[]),
        scenes: SceneExtractor::new().extract(&text),
    };
    tracing::info!(
        scenes = parsed.scenes.len(),
        persona = %parsed.persona_name,
        "Parsed reply"
    );

    let json =
        serde_json::to_string_pretty(&parsed).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
