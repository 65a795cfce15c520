//! Image/video generation error types and failure classification.

/// Failure code the provider reports when a task produced unusable output.
///
/// Scenes failing with this code get one retry with a simplified prompt.
pub const BAD_OUTPUT_FAILURE_CODE: &str = "INTERNAL.BAD_OUTPUT.CODE01";

/// Phrase the provider puts in error payloads once the daily quota is spent.
pub const DAILY_TASK_LIMIT_PHRASE: &str = "daily task limit";

/// Generation-service error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// API key not found in environment
    #[display("RUNWAYML_API_SECRET environment variable not set")]
    MissingApiKey,
    /// Provider signalled a rate limit or exhausted quota
    #[display("Rate limited: {}", _0)]
    RateLimited(String),
    /// Non-success HTTP status from the provider
    #[display("HTTP {} error: {}", status_code, message)]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message or body
        message: String,
    },
    /// Request never reached the provider or the connection dropped
    #[display("Request failed: {}", _0)]
    Transport(String),
    /// Provider ran the task and reported failure
    #[display("Task {} failed: {}", task_id, message)]
    TaskFailed {
        /// Provider task id
        task_id: String,
        /// Provider failure code, if any
        failure_code: Option<String>,
        /// Human-readable failure reason
        message: String,
    },
    /// Task was cancelled on the provider side
    #[display("Task {} was cancelled", _0)]
    TaskCancelled(String),
    /// Task did not finish within the polling budget
    #[display("Task {} did not finish after {} polls", task_id, polls)]
    Timeout {
        /// Provider task id
        task_id: String,
        /// Number of status polls issued
        polls: usize,
    },
    /// Task succeeded without an output URL
    #[display("Task {} returned no output", _0)]
    MissingOutput(String),
    /// Response body could not be decoded
    #[display("Unexpected response: {}", _0)]
    UnexpectedResponse(String),
}

impl GenerationErrorKind {
    /// Whether this failure means the provider is refusing further work.
    ///
    /// True for explicit rate-limit errors, HTTP 429, and any message carrying the
    /// provider's "daily task limit" phrase (matched case-insensitively).
    pub fn is_rate_limit(&self) -> bool {
        match self {
            GenerationErrorKind::RateLimited(_) => true,
            GenerationErrorKind::Api {
                status_code,
                message,
            } => *status_code == 429 || mentions_daily_limit(message),
            GenerationErrorKind::TaskFailed { message, .. } => mentions_daily_limit(message),
            _ => false,
        }
    }

    /// Whether the task failed with the provider's "bad output" failure code.
    pub fn is_bad_output(&self) -> bool {
        self.failure_code() == Some(BAD_OUTPUT_FAILURE_CODE)
    }

    /// Provider failure code, when the provider supplied one.
    pub fn failure_code(&self) -> Option<&str> {
        match self {
            GenerationErrorKind::TaskFailed { failure_code, .. } => failure_code.as_deref(),
            _ => None,
        }
    }

    /// Check if this error type should be retried while polling a task.
    ///
    /// Rate limits are deliberately excluded: the pipeline short-circuits on them.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationErrorKind::Api { status_code, .. } => {
                matches!(*status_code, 408 | 500 | 502 | 503 | 504)
            }
            GenerationErrorKind::Transport(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            GenerationErrorKind::Api { status_code, .. } => match *status_code {
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            GenerationErrorKind::Transport(_) => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }
}

fn mentions_daily_limit(message: &str) -> bool {
    message.to_lowercase().contains(DAILY_TASK_LIMIT_PHRASE)
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use vignette_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Api {
///     status_code: 429,
///     message: "Too many requests".to_string(),
/// });
/// assert!(err.kind.is_rate_limit());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use vignette_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::Api {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// assert_eq!(max_delay, 60);
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}

/// Result type for generation calls.
pub type GeneratorResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_limit_phrase_is_case_insensitive() {
        let kind = GenerationErrorKind::Api {
            status_code: 400,
            message: "Your Daily Task Limit has been reached.".to_string(),
        };
        assert!(kind.is_rate_limit());
    }

    #[test]
    fn bad_output_requires_exact_code() {
        let bad = GenerationErrorKind::TaskFailed {
            task_id: "t1".to_string(),
            failure_code: Some(BAD_OUTPUT_FAILURE_CODE.to_string()),
            message: "unusable".to_string(),
        };
        let other = GenerationErrorKind::TaskFailed {
            task_id: "t2".to_string(),
            failure_code: Some("SAFETY.INPUT.TEXT".to_string()),
            message: "moderated".to_string(),
        };
        assert!(bad.is_bad_output());
        assert!(!other.is_bad_output());
        assert!(!bad.is_rate_limit());
    }

    #[test]
    fn rate_limit_is_not_retryable() {
        let kind = GenerationErrorKind::Api {
            status_code: 429,
            message: "slow down".to_string(),
        };
        assert!(kind.is_rate_limit());
        assert!(!kind.is_retryable());
    }
}
