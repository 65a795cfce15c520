//! Core data types for Vignette.
//!
//! Scenes parsed from assistant text, the per-scene generation results the pipeline
//! produces, and the conversation and persona records the history store persists.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod conversation;
mod message;
mod persona;
mod phase;
mod result;
mod role;
mod scene;
mod settings;

pub use conversation::{ConversationRecord, DEFAULT_TITLE, derive_title};
pub use message::Message;
pub use persona::{PersonaMetadata, PersonaRecord, PersonaStatus, persona_id};
pub use phase::Phase;
pub use result::{
    GenerationResult, SceneStatus, SceneUpdate, VIDEO_VALIDITY_HOURS, validity_window,
};
pub use role::Role;
pub use scene::Scene;
pub use settings::{Settings, SettingsPatch};
