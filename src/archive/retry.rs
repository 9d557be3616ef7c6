//! Bounded retry with exponential backoff for the archive request.
//!
//! The policy is explicit data rather than an annotation: the fetcher decides
//! which errors count as transient via the predicate.

use log::warn;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration: total attempt cap, delay before the first retry and
/// the factor applied to the delay after every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
}

/// 4 attempts with delays of 3, 6 and 12 seconds between them.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(3),
            backoff_factor: 2,
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt cap is reached. Exhaustion surfaces the last transient error.
pub(crate) async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_transient: P,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    let mut delay = policy.initial_delay;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && attempt < policy.max_attempts => {
                warn!(
                    "Transient archive error (attempt {attempt}/{}), retrying in {delay:?}: {e}",
                    policy.max_attempts
                );
                sleep(delay).await;
                delay *= policy.backoff_factor;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (transient: {})", self.transient)
        }
    }

    fn transient() -> TestError {
        TestError { transient: true }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_fourth_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_retry(
            &RetryPolicy::default(),
            |e: &TestError| e.transient,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 4 {
                        Err(transient())
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_four_attempts_with_backoff_delays() {
        let start = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let result: Result<(), TestError> = with_retry(
            &RetryPolicy::default(),
            |e: &TestError| e.transient,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 3 + 6 + 12 seconds of backoff between the four attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TestError> = with_retry(
            &RetryPolicy::default(),
            |e: &TestError| e.transient,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError { transient: false }) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
