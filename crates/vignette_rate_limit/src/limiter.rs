//! Client-side request pacing using governor.
//!
//! The GCRA limiter spaces submissions so a long run does not trip the provider's
//! own limiter. Pacing only delays requests; it never fails them.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, trace};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces outgoing provider requests to a requests-per-minute budget.
///
/// # Example
///
/// ```
/// use vignette_rate_limit::RequestPacer;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pacer = RequestPacer::new(Some(20));
/// pacer.acquire().await;
/// // ... submit task ...
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestPacer {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
}

impl RequestPacer {
    /// Create a pacer; `None` or zero disables pacing.
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let rpm_limiter = requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|rpm| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(rpm))));
        debug!(
            rpm = ?requests_per_minute,
            enabled = rpm_limiter.is_some(),
            "Creating request pacer"
        );
        Self { rpm_limiter }
    }

    /// A pacer that never waits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Whether pacing is active.
    pub fn is_enabled(&self) -> bool {
        self.rpm_limiter.is_some()
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.rpm_limiter {
            trace!("Waiting for request pacing");
            limiter.until_ready().await;
        }
    }
}
