//! Conversation and persona history over a key-value store.
//!
//! Four documents are kept:
//! - `conversations`: every conversation, newest first
//! - `personas`: every persona record, oldest first
//! - `settings`: user settings, merged with defaults on read
//! - `activeConversation`: id of the conversation last saved or opened
//!
//! Conversations are capped; evicting one also deletes its personas.

use crate::{
    EXPORT_VERSION, ExportDocument, FileSystemStore, ImportDocument, KeyValueStore, MemoryStore,
    StorageStats,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use vignette_core::{
    ConversationRecord, GenerationResult, Message, PersonaRecord, Phase, Scene, SceneUpdate,
    Settings, SettingsPatch, derive_title,
};
use vignette_error::{StorageError, StorageErrorKind, StorageResult};
use vignette_rate_limit::StorageConfig;

/// Key of the conversation list.
pub const CONVERSATIONS_KEY: &str = "conversations";
/// Key of the persona list.
pub const PERSONAS_KEY: &str = "personas";
/// Key of the settings document.
pub const SETTINGS_KEY: &str = "settings";
/// Key of the active conversation id.
pub const ACTIVE_CONVERSATION_KEY: &str = "activeConversation";

/// Persisted conversation and persona history.
///
/// Reads go straight to the store. Read-modify-write sequences are serialized
/// through an internal lock, so one `HistoryStore` handle must be the only writer
/// to its store.
///
/// # Example
///
/// ```
/// use vignette_core::{Message, Phase};
/// use vignette_storage::HistoryStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let history = HistoryStore::in_memory();
/// let record = history
///     .save_conversation("conv-1", vec![Message::user("Life in Edo-period Japan")], Phase::Clarification)
///     .await?;
/// assert_eq!(record.title, "Life in Edo-period Japan");
/// assert_eq!(history.active_conversation().await?.as_deref(), Some("conv-1"));
/// # Ok(())
/// # }
/// ```
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    defaults: Settings,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("backend", &self.store.backend_name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl HistoryStore {
    /// Wrap a key-value store using default limits.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            defaults: Settings::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Wrap a key-value store using limits from configuration.
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        let mut history = Self::new(store);
        history.defaults = Settings::default()
            .with_max_conversations(*config.max_conversations())
            .with_max_personas(*config.max_personas());
        history
    }

    /// History kept in memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// History kept in files under `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    pub fn open(path: impl Into<PathBuf>, config: &StorageConfig) -> StorageResult<Self> {
        let store = FileSystemStore::new(path)?;
        Ok(Self::with_config(Arc::new(store), config))
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> StorageResult<T> {
        match self.store.get(key).await? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                StorageError::new(StorageErrorKind::Serialization(format!("{key}: {e}")))
            }),
            None => Ok(T::default()),
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("{key}: {e}")))
        })?;
        self.store.put(key, &json).await
    }

    async fn load_conversations(&self) -> StorageResult<Vec<ConversationRecord>> {
        self.load(CONVERSATIONS_KEY).await
    }

    async fn load_personas(&self) -> StorageResult<Vec<PersonaRecord>> {
        self.load(PERSONAS_KEY).await
    }

    // ---- Conversations ----

    /// Insert or update a conversation and make it the active one.
    ///
    /// New conversations go to the front of the list. When the list grows beyond
    /// `max_conversations`, the oldest are dropped along with their personas.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn save_conversation(
        &self,
        id: &str,
        messages: Vec<Message>,
        phase: Phase,
    ) -> StorageResult<ConversationRecord> {
        let _guard = self.write_lock.lock().await;
        let max_conversations = *self.settings().await?.max_conversations();
        let mut conversations = self.load_conversations().await?;

        let record = match conversations.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.title = derive_title(&messages);
                existing.message_count = messages.len();
                existing.messages = messages;
                existing.current_phase = phase;
                existing.last_modified = Utc::now();
                debug!("Updated existing conversation");
                existing.clone()
            }
            None => {
                let record = ConversationRecord::new(id, messages, phase);
                conversations.insert(0, record.clone());
                info!(title = %record.title, "Saved new conversation");
                record
            }
        };

        let evicted = if conversations.len() > max_conversations {
            conversations.split_off(max_conversations)
        } else {
            Vec::new()
        };
        self.save(CONVERSATIONS_KEY, &conversations).await?;

        if !evicted.is_empty() {
            let evicted_ids: Vec<&str> = evicted.iter().map(|c| c.id.as_str()).collect();
            let mut personas = self.load_personas().await?;
            let before = personas.len();
            personas.retain(|p| !evicted_ids.contains(&p.conversation_id.as_str()));
            self.save(PERSONAS_KEY, &personas).await?;
            warn!(
                evicted = ?evicted_ids,
                personas_removed = before - personas.len(),
                "Evicted oldest conversations"
            );
        }

        self.save(ACTIVE_CONVERSATION_KEY, id).await?;
        Ok(record)
    }

    /// Look up a conversation.
    pub async fn conversation(&self, id: &str) -> StorageResult<Option<ConversationRecord>> {
        Ok(self
            .load_conversations()
            .await?
            .into_iter()
            .find(|c| c.id == id))
    }

    /// Every conversation, newest first.
    pub async fn conversations(&self) -> StorageResult<Vec<ConversationRecord>> {
        self.load_conversations().await
    }

    /// Delete a conversation and its personas. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn delete_conversation(&self, id: &str) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut conversations = self.load_conversations().await?;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        let existed = conversations.len() != before;
        if existed {
            self.save(CONVERSATIONS_KEY, &conversations).await?;
        }

        let removed = self.remove_personas_where(|p| p.conversation_id == id).await?;

        if self.active_conversation().await?.as_deref() == Some(id) {
            self.store.delete(ACTIVE_CONVERSATION_KEY).await?;
        }

        info!(existed, personas_removed = removed, "Deleted conversation");
        Ok(existed)
    }

    /// Id of the active conversation.
    pub async fn active_conversation(&self) -> StorageResult<Option<String>> {
        self.load(ACTIVE_CONVERSATION_KEY).await
    }

    /// Mark a conversation as active.
    pub async fn set_active_conversation(&self, id: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        self.save(ACTIVE_CONVERSATION_KEY, id).await
    }

    // ---- Personas ----

    /// Insert or update a persona's scenes.
    ///
    /// An existing record keeps its id and creation time and takes the new scene
    /// list. When the number of personas exceeds `max_personas`, the oldest are
    /// dropped.
    #[instrument(skip(self, scenes), fields(scene_count = scenes.len()))]
    pub async fn save_persona(
        &self,
        conversation_id: &str,
        persona_name: &str,
        scenes: Vec<GenerationResult>,
    ) -> StorageResult<PersonaRecord> {
        let _guard = self.write_lock.lock().await;
        let max_personas = *self.settings().await?.max_personas();
        let mut personas = self.load_personas().await?;
        let id = vignette_core::persona_id(conversation_id, persona_name);

        let record = match personas.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                existing.persona_name = persona_name.to_string();
                existing.scenes = scenes;
                existing.refresh_metadata();
                existing.last_updated = Some(Utc::now());
                debug!(persona_id = %id, "Updated existing persona");
                existing.clone()
            }
            None => {
                let mut record = PersonaRecord::with_results(conversation_id, persona_name, scenes);
                record.last_updated = Some(record.created_at);
                personas.push(record.clone());
                info!(persona_id = %id, "Saved new persona");
                record
            }
        };

        if personas.len() > max_personas {
            personas.sort_by_key(|p| p.created_at);
            let excess = personas.len() - max_personas;
            let evicted: Vec<String> = personas.drain(..excess).map(|p| p.id).collect();
            warn!(evicted = ?evicted, "Evicted oldest personas");
        }

        self.save(PERSONAS_KEY, &personas).await?;
        Ok(record)
    }

    /// Merge an update into one scene of a persona.
    ///
    /// The scene is matched by number and appended when missing. An update that
    /// carries a video URL completes the scene and restarts its validity window.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no persona has `persona_id`.
    #[instrument(skip(self, update))]
    pub async fn update_persona_scene(
        &self,
        persona_id: &str,
        scene_number: u32,
        update: &SceneUpdate,
    ) -> StorageResult<PersonaRecord> {
        let _guard = self.write_lock.lock().await;
        let mut personas = self.load_personas().await?;
        let persona = personas
            .iter_mut()
            .find(|p| p.id == persona_id)
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(persona_id.to_string()))
            })?;

        let index = match persona
            .scenes
            .iter()
            .position(|s| s.scene_number() == scene_number)
        {
            Some(index) => index,
            None => {
                debug!("Appending scene missing from persona");
                persona
                    .scenes
                    .push(GenerationResult::pending(Scene::new(scene_number, "", "", "")));
                persona.scenes.len() - 1
            }
        };

        let scene = &mut persona.scenes[index];
        scene.apply(update);
        if update.video_url.is_some() {
            scene.status = vignette_core::SceneStatus::Complete;
            scene.stamp_generated(Utc::now());
        }

        persona.refresh_metadata();
        persona.last_updated = Some(Utc::now());
        let record = persona.clone();
        self.save(PERSONAS_KEY, &personas).await?;
        Ok(record)
    }

    /// Personas generated within a conversation.
    pub async fn personas_for_conversation(
        &self,
        conversation_id: &str,
    ) -> StorageResult<Vec<PersonaRecord>> {
        Ok(self
            .load_personas()
            .await?
            .into_iter()
            .filter(|p| p.conversation_id == conversation_id)
            .collect())
    }

    /// Look up a persona.
    pub async fn persona(&self, persona_id: &str) -> StorageResult<Option<PersonaRecord>> {
        Ok(self
            .load_personas()
            .await?
            .into_iter()
            .find(|p| p.id == persona_id))
    }

    /// Every persona, oldest first.
    pub async fn personas(&self) -> StorageResult<Vec<PersonaRecord>> {
        self.load_personas().await
    }

    /// Delete a persona. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn delete_persona(&self, persona_id: &str) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().await;
        Ok(self.remove_personas_where(|p| p.id == persona_id).await? > 0)
    }

    /// Delete every persona of a conversation. Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn delete_personas_by_conversation(
        &self,
        conversation_id: &str,
    ) -> StorageResult<usize> {
        let _guard = self.write_lock.lock().await;
        self.remove_personas_where(|p| p.conversation_id == conversation_id)
            .await
    }

    /// Caller must hold the write lock.
    async fn remove_personas_where(
        &self,
        matches: impl Fn(&PersonaRecord) -> bool,
    ) -> StorageResult<usize> {
        let mut personas = self.load_personas().await?;
        let before = personas.len();
        personas.retain(|p| !matches(p));
        let removed = before - personas.len();
        if removed > 0 {
            self.save(PERSONAS_KEY, &personas).await?;
        }
        Ok(removed)
    }

    /// Whether a scene's media is still inside its validity window.
    pub fn is_video_valid(&self, result: &GenerationResult) -> bool {
        result.is_video_valid()
    }

    // ---- Settings ----

    /// Stored settings merged over the defaults.
    pub async fn settings(&self) -> StorageResult<Settings> {
        let patch: SettingsPatch = self.load(SETTINGS_KEY).await?;
        Ok(self.defaults.clone().merged(&patch))
    }

    /// Apply a partial settings update and return the result.
    #[instrument(skip(self))]
    pub async fn update_settings(&self, patch: &SettingsPatch) -> StorageResult<Settings> {
        let _guard = self.write_lock.lock().await;
        let settings = self.settings().await?.merged(patch);
        self.save(SETTINGS_KEY, &settings).await?;
        Ok(settings)
    }

    // ---- Bulk operations ----

    /// Snapshot the whole history.
    #[instrument(skip(self))]
    pub async fn export(&self) -> StorageResult<ExportDocument> {
        Ok(ExportDocument {
            conversations: self.load_conversations().await?,
            personas: self.load_personas().await?,
            settings: self.settings().await?,
            exported_at: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Replace the sections present in `document`.
    #[instrument(skip(self, document), fields(version = ?document.version))]
    pub async fn import(&self, document: ImportDocument) -> StorageResult<()> {
        if let Some(version) = document.version.as_deref()
            && version != EXPORT_VERSION
        {
            warn!(version, expected = EXPORT_VERSION, "Importing unrecognized export version");
        }

        let _guard = self.write_lock.lock().await;
        if let Some(conversations) = &document.conversations {
            self.save(CONVERSATIONS_KEY, conversations).await?;
        }
        if let Some(personas) = &document.personas {
            self.save(PERSONAS_KEY, personas).await?;
        }
        if let Some(settings) = &document.settings {
            self.save(SETTINGS_KEY, settings).await?;
        }

        info!(
            conversations = document.conversations.as_ref().map(Vec::len),
            personas = document.personas.as_ref().map(Vec::len),
            "Imported history"
        );
        Ok(())
    }

    /// Parse and import a JSON export.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::Import`] if `json` is not an export document.
    pub async fn import_json(&self, json: &str) -> StorageResult<()> {
        let document: ImportDocument = serde_json::from_str(json)
            .map_err(|e| StorageError::new(StorageErrorKind::Import(e.to_string())))?;
        self.import(document).await
    }

    /// Remove all history and settings.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        for key in [
            CONVERSATIONS_KEY,
            PERSONAS_KEY,
            SETTINGS_KEY,
            ACTIVE_CONVERSATION_KEY,
        ] {
            self.store.delete(key).await?;
        }
        info!("Cleared history");
        Ok(())
    }

    /// Counts over the stored history.
    pub async fn stats(&self) -> StorageResult<StorageStats> {
        let conversations = self.load_conversations().await?;
        let personas = self.load_personas().await?;
        let now = Utc::now();
        Ok(StorageStats {
            conversations: conversations.len(),
            personas: personas.len(),
            total_messages: conversations.iter().map(|c| c.messages.len()).sum(),
            total_scenes: personas.iter().map(|p| p.scenes.len()).sum(),
            active_videos: personas.iter().map(|p| p.valid_videos_at(now)).sum(),
            expired_videos: personas.iter().map(|p| p.expired_videos_at(now)).sum(),
        })
    }
}
