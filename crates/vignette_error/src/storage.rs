//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a value
    #[display("Failed to write value: {}", _0)]
    Write(String),
    /// Failed to read a value
    #[display("Failed to read value: {}", _0)]
    Read(String),
    /// Failed to delete a value
    #[display("Failed to delete value: {}", _0)]
    Delete(String),
    /// Record not found under the given id
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Key is empty or contains characters the backend cannot store
    #[display("Invalid key: {}", _0)]
    InvalidKey(String),
    /// Stored document could not be (de)serialized
    #[display("Serialization failed: {}", _0)]
    Serialization(String),
    /// Import document rejected
    #[display("Import failed: {}", _0)]
    Import(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use vignette_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("conv_1_Mei_Lin".to_string()));
/// assert!(format!("{}", err).contains("Not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
