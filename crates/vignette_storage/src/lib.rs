//! Conversation and persona history for Vignette.
//!
//! [`HistoryStore`] keeps conversations, generated personas and settings as JSON
//! documents in a pluggable [`KeyValueStore`]:
//! - [`FileSystemStore`]: one file per key, atomic writes
//! - [`MemoryStore`]: volatile, for tests and one-off runs
//!
//! [`PersonaRecorder`] connects the generation pipeline to the history.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod documents;
mod filesystem;
mod history;
mod memory;
mod recorder;
mod store;

pub use documents::{EXPORT_VERSION, ExportDocument, ImportDocument, StorageStats};
pub use filesystem::FileSystemStore;
pub use history::{
    ACTIVE_CONVERSATION_KEY, CONVERSATIONS_KEY, HistoryStore, PERSONAS_KEY, SETTINGS_KEY,
};
pub use memory::MemoryStore;
pub use recorder::PersonaRecorder;
pub use store::KeyValueStore;
