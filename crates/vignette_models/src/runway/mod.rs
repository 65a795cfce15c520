//! Runway image and video generation.

mod client;
mod dto;

pub use client::{API_KEY_ENV, FALLBACK_API_KEY_ENV, RunwayClient};
pub use dto::{
    ImageToVideoRequest, ImageToVideoRequestBuilder, ReferenceImage, TaskCreated, TaskOutcome,
    TaskResponse, TaskStatus, TextToImageRequest, TextToImageRequestBuilder,
};
