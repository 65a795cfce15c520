//! Text handling for Vignette conversations.
//!
//! - [`SceneExtractor`] turns assistant replies into [`vignette_core::Scene`]s
//! - [`PersonaNameResolver`] infers whose story the scenes tell
//! - [`ContextWindow`] trims history before it goes back to the language model
//!
//! Extraction and name resolution are heuristics over unstructured model output.
//! They never fail: the worst case is an empty scene list or the placeholder name.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod extraction;
mod persona;
mod prompt;

pub use context::ContextWindow;
pub use extraction::SceneExtractor;
pub use persona::{
    CapitalizedPhraseMatcher, ConversationMatcher, DEFAULT_PERSONA_NAME, DirectiveMatcher,
    NameMatcher, NarrativePatternMatcher, PersonaNameResolver, VISUALS_DIRECTIVE,
};
pub use prompt::CURATOR_PROMPT;
