//! Configuration and rate-limit handling for Vignette.
//!
//! - [`VignetteConfig`] loads layered TOML settings
//! - [`RateLimitDetector`] recognizes quota exhaustion in provider responses
//! - [`RequestPacer`] spaces requests on the client side

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod detector;
mod limiter;

pub use config::{
    ChatConfig, PipelineConfig, PipelineConfigBuilder, PipelineConfigBuilderError, RunwayConfig,
    StorageConfig, VignetteConfig,
};
pub use detector::{RateLimitDetector, error_message};
pub use limiter::RequestPacer;
