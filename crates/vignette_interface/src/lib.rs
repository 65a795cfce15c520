//! Trait definitions for Vignette.
//!
//! The generation pipeline talks to the image/video provider through
//! [`MediaGenerator`] and writes progress through [`SceneRecorder`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{MediaGenerator, SceneRecorder};
pub use types::{
    ImageRequest, ImageRequestBuilder, ImageRequestBuilderError, MediaRef, VideoRequest,
};
