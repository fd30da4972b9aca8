//! Simulated assistant latency
//!
//! Responses are held back for a time proportional to their length so the
//! conversation reads like a live assistant. The delay is presentation only:
//! matching and injection never depend on it.

use std::time::Duration;

/// Length-proportional response delay, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDelay {
    pub per_char: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl Default for ResponseDelay {
    fn default() -> Self {
        Self {
            per_char: Duration::from_millis(12),
            min: Duration::from_millis(400),
            max: Duration::from_millis(1500),
        }
    }
}

impl ResponseDelay {
    /// No delay at all. Turns resolve on the next poll.
    pub fn immediate() -> Self {
        Self {
            per_char: Duration::ZERO,
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn with_per_char(mut self, per_char: Duration) -> Self {
        self.per_char = per_char;
        self
    }

    pub fn with_min(mut self, min: Duration) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Delay before a response of the given text is shown.
    pub fn for_response(&self, response: &str) -> Duration {
        let chars = u32::try_from(response.chars().count()).unwrap_or(u32::MAX);
        let raw = self.per_char.saturating_mul(chars);
        // `clamp` panics when min > max; a misconfigured pair resolves to max.
        raw.max(self.min).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_is_zero() {
        let delay = ResponseDelay::immediate();
        assert_eq!(delay.for_response("a long response"), Duration::ZERO);
    }

    #[test]
    fn proportional_between_bounds() {
        let delay = ResponseDelay::default();
        let text = "x".repeat(100);
        assert_eq!(delay.for_response(&text), Duration::from_millis(1200));
    }

    #[test]
    fn short_responses_hit_the_floor() {
        assert_eq!(ResponseDelay::default().for_response("ok"), Duration::from_millis(400));
    }

    #[test]
    fn long_responses_hit_the_ceiling() {
        let text = "x".repeat(10_000);
        assert_eq!(ResponseDelay::default().for_response(&text), Duration::from_millis(1500));
    }

    #[test]
    fn inverted_bounds_resolve_to_max() {
        let delay = ResponseDelay::default()
            .with_min(Duration::from_secs(2))
            .with_max(Duration::from_secs(1));
        assert_eq!(delay.for_response("hi"), Duration::from_secs(1));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let delay = ResponseDelay::default()
            .with_per_char(Duration::from_millis(1))
            .with_min(Duration::ZERO);
        assert_eq!(delay.for_response("••••"), Duration::from_millis(4));
    }
}
