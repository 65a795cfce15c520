//! Generation provider integrations for Vignette.
//!
//! Providers implement [`vignette_interface::MediaGenerator`]. Currently:
//! - [`RunwayClient`]: Runway `text_to_image` and `image_to_video` tasks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod runway;

pub use runway::{
    API_KEY_ENV, FALLBACK_API_KEY_ENV, ImageToVideoRequest, ImageToVideoRequestBuilder,
    ReferenceImage, RunwayClient, TaskCreated, TaskOutcome, TaskResponse, TaskStatus,
    TextToImageRequest, TextToImageRequestBuilder,
};
