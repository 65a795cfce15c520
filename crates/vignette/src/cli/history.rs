//! History command handlers.

use super::commands::HistoryCommands;
use std::path::Path;
use vignette::{
    HistoryStore, JsonError, StorageError, StorageErrorKind, VignetteConfig, VignetteResult,
};

/// Handle history commands.
pub async fn handle_history_command(
    cmd: HistoryCommands,
    config: &VignetteConfig,
    data_dir: &Path,
) -> VignetteResult<()> {
    let history = HistoryStore::open(data_dir, config.storage())?;

    match cmd {
        HistoryCommands::List => list_conversations(&history).await,
        HistoryCommands::Show { id } => show_conversation(&history, &id).await,
        HistoryCommands::Delete { id } => delete_conversation(&history, &id).await,
        HistoryCommands::Export { path } => export_history(&history, &path).await,
        HistoryCommands::Import { path } => import_history(&history, &path).await,
        HistoryCommands::Stats => show_stats(&history).await,
        HistoryCommands::Clear { yes } => clear_history(&history, yes).await,
    }
}

async fn list_conversations(history: &HistoryStore) -> VignetteResult<()> {
    let conversations = history.conversations().await?;
    let active = history.active_conversation().await?;

    println!(
        "{:<2} {:<38} {:<14} {:<6} {:<17}",
        "", "Id", "Phase", "Turns", "Modified"
    );
    println!("{:-<80}", "");
    for conversation in &conversations {
        let marker = if active.as_deref() == Some(conversation.id.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<2} {:<38} {:<14} {:<6} {:<17}",
            marker,
            conversation.id,
            conversation.current_phase,
            conversation.message_count,
            conversation.last_modified.format("%Y-%m-%d %H:%M")
        );
        println!("   {}", conversation.title);
    }
    println!("Total: {} conversations", conversations.len());
    Ok(())
}

async fn show_conversation(history: &HistoryStore, id: &str) -> VignetteResult<()> {
    let conversation = history
        .conversation(id)
        .await?
        .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id.to_string())))?;
    let personas = history.personas_for_conversation(id).await?;

    let json = serde_json::to_string_pretty(&serde_json::json!({
        "conversation": conversation,
        "personas": personas,
    }))
    .map_err(|e| JsonError::new(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

async fn delete_conversation(history: &HistoryStore, id: &str) -> VignetteResult<()> {
    if history.delete_conversation(id).await? {
        println!("Deleted conversation {}", id);
    } else {
        eprintln!("No conversation with id {}", id);
    }
    Ok(())
}

async fn export_history(history: &HistoryStore, path: &Path) -> VignetteResult<()> {
    let document = history.export().await?;
    let json =
        serde_json::to_string_pretty(&document).map_err(|e| JsonError::new(e.to_string()))?;
    tokio::fs::write(path, json).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Write(format!("{}: {}", path.display(), e)))
    })?;
    println!(
        "Exported {} conversations and {} personas to {}",
        document.conversations.len(),
        document.personas.len(),
        path.display()
    );
    Ok(())
}

async fn import_history(history: &HistoryStore, path: &Path) -> VignetteResult<()> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Read(format!("{}: {}", path.display(), e)))
    })?;
    history.import_json(&json).await?;
    println!("Imported history from {}", path.display());
    Ok(())
}

async fn show_stats(history: &HistoryStore) -> VignetteResult<()> {
    let stats = history.stats().await?;
    println!("Conversations:  {}", stats.conversations);
    println!("Personas:       {}", stats.personas);
    println!("Messages:       {}", stats.total_messages);
    println!("Scenes:         {}", stats.total_scenes);
    println!("Active videos:  {}", stats.active_videos);
    println!("Expired videos: {}", stats.expired_videos);
    Ok(())
}

async fn clear_history(history: &HistoryStore, confirmed: bool) -> VignetteResult<()> {
    if !confirmed {
        eprintln!("Refusing to clear history without --yes");
        return Ok(());
    }
    history.clear().await?;
    println!("History cleared");
    Ok(())
}
