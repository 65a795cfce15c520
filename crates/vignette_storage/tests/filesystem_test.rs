//! Filesystem backend tests.

use tempfile::TempDir;
use vignette_core::{GenerationResult, Message, Phase, Scene};
use vignette_error::StorageErrorKind;
use vignette_rate_limit::StorageConfig;
use vignette_storage::{FileSystemStore, HistoryStore, KeyValueStore};

#[tokio::test]
async fn test_put_get_delete() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = FileSystemStore::new(dir.path())?;

    assert_eq!(store.get("conversations").await?, None);
    store.put("conversations", "[]").await?;
    assert_eq!(store.get("conversations").await?.as_deref(), Some("[]"));

    store.put("conversations", "[1]").await?;
    assert_eq!(store.get("conversations").await?.as_deref(), Some("[1]"));

    store.delete("conversations").await?;
    assert_eq!(store.get("conversations").await?, None);
    store.delete("conversations").await?;
    Ok(())
}

#[tokio::test]
async fn test_keys_report_original_names() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = FileSystemStore::new(dir.path())?;
    store.put("personas", "[]").await?;
    store.put("a/b c", "x").await?;
    std::fs::write(dir.path().join("notes.txt"), "ignored")?;

    let mut keys = store.keys().await?;
    keys.sort();
    assert_eq!(keys, vec!["a/b c".to_string(), "personas".to_string()]);
    assert_eq!(store.backend_name(), "filesystem");
    Ok(())
}

#[tokio::test]
async fn test_empty_key_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = FileSystemStore::new(dir.path())?;
    let err = store.put("", "value").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::InvalidKey(_)));
    Ok(())
}

#[tokio::test]
async fn test_history_survives_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = StorageConfig::default();

    {
        let history = HistoryStore::open(dir.path().join("history"), &config)?;
        history
            .save_conversation("c1", vec![Message::user("Song dynasty")], Phase::Curation)
            .await?;
        history
            .save_persona(
                "c1",
                "Su Shi",
                vec![GenerationResult::pending(Scene::new(1, "Exile", "prompt", "context"))],
            )
            .await?;
    }

    let reopened = HistoryStore::open(dir.path().join("history"), &config)?;
    let conversation = reopened
        .conversation("c1")
        .await?
        .ok_or_else(|| anyhow::anyhow!("conversation missing"))?;
    assert_eq!(conversation.title, "Song dynasty");
    assert_eq!(reopened.active_conversation().await?.as_deref(), Some("c1"));
    assert_eq!(reopened.personas_for_conversation("c1").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_entry_is_reported() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = FileSystemStore::new(dir.path())?;
    store.put("conversations", "not json").await?;

    let history = HistoryStore::new(std::sync::Arc::new(store));
    let err = history.conversations().await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Serialization(_)));
    Ok(())
}
