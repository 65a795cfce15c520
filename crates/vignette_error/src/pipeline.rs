//! Generation pipeline error types.

/// Run-level failures that abort a generation run.
///
/// Per-scene failures never surface here; they are recorded on the scene result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Input rejected before any scene was attempted
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// Failed to write scene progress through to the history store
    #[display("Recorder failed: {}", _0)]
    Recorder(String),
    /// Run ended with a terminal error event
    #[display("Run aborted: {}", _0)]
    Aborted(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// Error kind
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
