//! Conversation phases.

use serde::{Deserialize, Serialize};

/// Stage of the guided conversation a transcript has reached.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Narrowing down the historical topic
    #[default]
    Clarification,
    /// Historical context and persona selection
    Curation,
    /// Scenes are being rendered for a chosen persona
    Visualization,
}

impl Phase {
    /// Short human description of the phase.
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Clarification => "Asking clarifying questions",
            Phase::Curation => "Exploring historical perspectives",
            Phase::Visualization => "Ready for visual storytelling",
        }
    }
}
