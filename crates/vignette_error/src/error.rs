//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, JsonError, PipelineError, StorageError};

/// Every error the Vignette crates can surface.
///
/// # Examples
///
/// ```
/// use vignette_error::{VignetteError, JsonError};
///
/// let json_err = JsonError::new("expected value at line 1 column 1");
/// let err: VignetteError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VignetteErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Image/video generation error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Persistence error
    #[from(StorageError)]
    Storage(StorageError),
    /// Run-level pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Vignette error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vignette_error::{VignetteResult, ConfigError};
///
/// fn might_fail() -> VignetteResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vignette Error: {}", _0)]
pub struct VignetteError(Box<VignetteErrorKind>);

impl VignetteError {
    /// Create a new error from a kind.
    pub fn new(kind: VignetteErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VignetteErrorKind {
        &self.0
    }
}

impl<T> From<T> for VignetteError
where
    T: Into<VignetteErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vignette operations.
pub type VignetteResult<T> = std::result::Result<T, VignetteError>;
