//! Bounded retry with exponential backoff around source operations.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use yt_source::SourceError;

/// Retry policy for transient source errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Whether to add up to 25% jitter to delays.
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            use_jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = base_ms.min(self.max_delay.as_millis() as f64).max(0.0) as u64;

        if self.use_jitter {
            let jitter = (delay_ms as f64 * 0.25 * rand::random::<f64>()) as u64;
            Duration::from_millis(delay_ms + jitter)
        } else {
            Duration::from_millis(delay_ms)
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Source of backoff delays, replaceable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `op` until it succeeds, fails definitively, or the attempts run out.
///
/// Definitive errors return immediately; after the last attempt the last
/// transient error is returned.
pub async fn retry_source<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    op_name: &str,
    mut op: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = op_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_definitive() => {
                debug!(op = op_name, attempt, error = %e, "Definitive failure, not retrying");
                return Err(e);
            }
            Err(e) if attempt >= attempts => {
                warn!(op = op_name, attempts, error = %e, "Retries exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after_attempt(attempt);
                warn!(
                    op = op_name,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct RecordingSleeper(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().push(duration);
        }
    }

    #[test]
    fn test_default_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after_attempt(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_secs(20));
        assert_eq!(policy.delay_after_attempt(10), Duration::from_secs(60));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy {
            use_jitter: true,
            ..Default::default()
        };
        for _ in 0..50 {
            let d = policy.delay_after_attempt(1);
            assert!(d >= Duration::from_secs(5));
            assert!(d <= Duration::from_millis(6250));
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result = retry_source(&RetryPolicy::default(), &sleeper, "list", || async {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(SourceError::RateLimited("429".into())),
                1 => Err(SourceError::Transient("reset".into())),
                _ => Ok(42),
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.0.lock(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_definitive_short_circuits() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_source(&RetryPolicy::default(), &sleeper, "fetch", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::VideoUnavailable("removed".into()))
        })
        .await;

        assert!(matches!(result, Err(SourceError::VideoUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_source(&RetryPolicy::default(), &sleeper, "fetch", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Transient(format!("attempt {n}")))
        })
        .await;

        match result {
            Err(SourceError::Transient(msg)) => assert_eq!(msg, "attempt 2"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sleeper.0.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        let result = retry_source(&policy, &RecordingSleeper::default(), "op", || async {
            Ok::<_, SourceError>("ok")
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
    }
}
