//! Error types for the Vignette crates.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vignette_error::{VignetteResult, ConfigError};
//!
//! fn load_settings() -> VignetteResult<String> {
//!     Err(ConfigError::new("Missing [runway] table"))?
//! }
//!
//! assert!(load_settings().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod json;
mod pipeline;
mod storage;

pub use config::ConfigError;
pub use error::{VignetteError, VignetteErrorKind, VignetteResult};
pub use generation::{
    BAD_OUTPUT_FAILURE_CODE, DAILY_TASK_LIMIT_PHRASE, GenerationError, GenerationErrorKind,
    GeneratorResult, RetryableError,
};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineResult};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
