//! State carried from one scene to the next within a single run.

use tracing::warn;

/// Per-run state threaded through the scene fold.
///
/// A fresh context starts every run, so a rate limit seen in one run never
/// affects the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    rate_limited: bool,
    reference_image: Option<String>,
}

impl RunContext {
    /// Whether the provider refused work earlier in this run.
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limited
    }

    /// Stop issuing video requests for the rest of the run.
    pub fn mark_rate_limited(&mut self) {
        if !self.rate_limited {
            warn!("Rate limit reached, skipping video generation for remaining scenes");
        }
        self.rate_limited = true;
    }

    /// Style reference captured from the first scene's image.
    pub fn reference_image(&self) -> Option<&str> {
        self.reference_image.as_deref()
    }

    /// Keep `url` as the style reference unless one is already set.
    pub fn remember_reference(&mut self, url: &str) {
        if self.reference_image.is_none() {
            self.reference_image = Some(url.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reference_wins() {
        let mut ctx = RunContext::default();
        ctx.remember_reference("https://cdn.example/1.png");
        ctx.remember_reference("https://cdn.example/2.png");
        assert_eq!(ctx.reference_image(), Some("https://cdn.example/1.png"));
    }

    #[test]
    fn rate_limit_flag_is_sticky() {
        let mut ctx = RunContext::default();
        assert!(!ctx.is_rate_limited());
        ctx.mark_rate_limited();
        ctx.mark_rate_limited();
        assert!(ctx.is_rate_limited());
    }
}
