//! Image and video generation pipeline for Vignette.
//!
//! [`GenerationPipeline`] turns extracted scenes into media one scene at a time and
//! reports progress as a stream of [`ProgressEvent`]s.
//!
//! Per scene:
//! - sanitize the prompt ([`PromptSanitizer`])
//! - render the still image
//! - animate it into a clip, unless the run is already rate-limited
//! - degrade to the still image when the clip cannot be produced
//!
//! A provider "bad output" failure on the image gets exactly one retry with a
//! simplified prompt.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod events;
mod pipeline;
mod sanitize;

pub use context::RunContext;
pub use events::{ProgressEvent, RunSummary};
pub use pipeline::GenerationPipeline;
pub use sanitize::PromptSanitizer;
