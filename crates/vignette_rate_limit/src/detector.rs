//! Recognizing provider rate-limit signals in HTTP responses.
//!
//! The provider reports quota exhaustion three ways: HTTP 429, a JSON body whose
//! `error` field mentions the "daily task limit", or both. A `Retry-After` header,
//! when present, is surfaced in the message.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use vignette_error::{DAILY_TASK_LIMIT_PHRASE, GenerationErrorKind};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Extract the `error` message from a provider error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Classifies non-success provider responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitDetector;

impl RateLimitDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Whether `message` carries the provider's quota-exhausted phrase.
    pub fn is_daily_limit_message(&self, message: &str) -> bool {
        message.to_lowercase().contains(DAILY_TASK_LIMIT_PHRASE)
    }

    /// Map a failed response onto a generation error kind.
    ///
    /// Rate-limit responses become [`GenerationErrorKind::RateLimited`]; everything
    /// else becomes [`GenerationErrorKind::Api`].
    #[instrument(skip(self, headers, body), fields(status = status.as_u16()))]
    pub fn classify(
        &self,
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
    ) -> GenerationErrorKind {
        let message = error_message(body);
        if status == StatusCode::TOO_MANY_REQUESTS || self.is_daily_limit_message(&message) {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!(" (retry after {v})"))
                .unwrap_or_default();
            warn!(message = %message, "Provider rate limit detected");
            return GenerationErrorKind::RateLimited(format!("{message}{retry_after}"));
        }
        debug!(message = %message, "Provider returned an error response");
        GenerationErrorKind::Api {
            status_code: status.as_u16(),
            message,
        }
    }
}
