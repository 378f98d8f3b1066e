use rand::Rng;
use std::time::Duration;

/// Bounded retry policy for a single source attempt.
///
/// Deliberately minimal: most stats sources fail because of inherent access
/// restriction rather than transient load, so aggressive retrying only burns
/// latency budget. The default is a single retry with a short fixed backoff
/// plus a little jitter to decorrelate concurrent per-team pipelines.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_retries,
            backoff,
            jitter: backoff / 4,
        }
    }

    /// Total call attempts, including the first.
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay to sleep before the given retry (attempt index 1 = first
    /// retry). Fixed backoff plus uniform jitter in `[0, jitter]`.
    pub fn delay_before(&self, _attempt: u32) -> Duration {
        if self.jitter.is_zero() {
            return self.backoff;
        }
        let extra_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.backoff + Duration::from_millis(extra_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(1, Duration::from_millis(400))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_exactly_one_retry() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts(), 2);
    }

    #[test]
    fn delay_is_bounded_by_backoff_plus_jitter() {
        let p = RetryPolicy::new(1, Duration::from_millis(400));
        for _ in 0..50 {
            let d = p.delay_before(1);
            assert!(d >= p.backoff);
            assert!(d <= p.backoff + p.jitter);
        }
    }

    #[test]
    fn zero_backoff_means_zero_delay() {
        let p = RetryPolicy::new(1, Duration::ZERO);
        assert_eq!(p.delay_before(1), Duration::ZERO);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let p = RetryPolicy::new(0, Duration::from_millis(100));
        assert_eq!(p.attempts(), 1);
    }
}
