//! Request and response values crossing the generation boundary.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Text-to-image request.
///
/// # Examples
///
/// ```
/// use vignette_interface::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("Harbor at dawn, 1906")
///     .ratio("1280:720")
///     .build()
///     .unwrap();
/// assert!(request.reference().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_new::new,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Sanitized rendering prompt
    prompt: String,
    /// Output aspect ratio in `W:H` pixels
    ratio: String,
    /// Style reference image URL
    #[builder(default, setter(strip_option))]
    reference: Option<String>,
}

impl ImageRequest {
    /// Create a builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Image-to-video request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct VideoRequest {
    /// Image the clip starts from
    source_image: String,
    /// Motion prompt
    prompt: String,
    /// Output aspect ratio in `W:H` pixels
    ratio: String,
    /// Clip length in seconds
    duration_secs: u32,
}

/// Reference to media produced by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct MediaRef {
    /// Provider task that produced the media
    task_id: String,
    /// Download URL
    url: String,
}

impl MediaRef {
    /// Create a media reference.
    pub fn new(task_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            url: url.into(),
        }
    }

    /// Consume the reference, keeping only the URL.
    pub fn into_url(self) -> String {
        self.url
    }
}
