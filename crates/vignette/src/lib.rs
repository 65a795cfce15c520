//! Vignette - historical persona storytelling
//!
//! Vignette turns a language model's scene-structured replies into illustrated, animated
//! stories told from a historical figure's point of view. It extracts scenes from the
//! reply text, renders an image and a short clip per scene through the Runway task API,
//! streams progress while it works, and keeps conversations and generated personas in a
//! local history.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use vignette::{GenerationPipeline, PersonaNameResolver, RunwayClient, SceneExtractor, VignetteConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VignetteConfig::load()?;
//!     let reply = std::fs::read_to_string("reply.txt")?;
//!
//!     let scenes = SceneExtractor::new().extract(&reply);
//!     let persona = PersonaNameResolver::new().resolve(&reply, &[]);
//!
//!     let client = RunwayClient::new(config.runway().clone())?;
//!     let pipeline = GenerationPipeline::new(Arc::new(client), &config);
//!     let mut events = Box::pin(pipeline.run(scenes, persona));
//!     while let Some(event) = events.next().await {
//!         println!("{}", event.to_sse_frame()?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `vignette_error` - Error types
//! - `vignette_core` - Scenes, results, conversations, personas, settings
//! - `vignette_interface` - `MediaGenerator` and `SceneRecorder` traits
//! - `vignette_rate_limit` - Configuration, request pacing, rate-limit detection
//! - `vignette_narrative` - Scene extraction, persona names, context window
//! - `vignette_models` - Runway client
//! - `vignette_pipeline` - Sequential image and video generation
//! - `vignette_storage` - Conversation and persona history
//!
//! This crate (`vignette`) re-exports everything for convenience.

pub use vignette_core::*;
pub use vignette_error::*;
pub use vignette_interface::*;
pub use vignette_models::*;
pub use vignette_narrative::*;
pub use vignette_pipeline::*;
pub use vignette_rate_limit::*;
pub use vignette_storage::*;
