//! Bounded retry and condition polling
//!
//! Every verification call site in the suite goes through these two
//! combinators instead of hand-rolled catch-and-loop blocks.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// Bounded retry parameters.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub delay: Duration,

    /// Multiplier applied to the delay after each failed attempt.
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
            backoff: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Run `op` until it succeeds, the error is not transient, or the attempt
/// budget is exhausted. Returns the last error on exhaustion.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> HarnessResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<T>>,
{
    let mut delay = policy.delay;
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_transient() => {
                debug!("attempt {}/{} for {} failed: {}", attempt, attempts, what, e);
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.backoff);
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("retry loop returns on the final attempt")
}

/// Poll `probe` every `interval` until it reports true or `timeout` elapses.
///
/// The probe itself may fail with a transient error (e.g. a stale element
/// mid-rerender); those are swallowed until the deadline.
pub async fn wait_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    what: &str,
    mut probe: F,
) -> HarnessResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<bool>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match probe().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) if e.is_transient() => {
                debug!("probe for {} errored transiently: {}", what, e);
            }
            Err(e) => return Err(e),
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(HarnessError::Timeout {
                what: what.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_first_try_without_sleeping() {
        let calls = AtomicU32::new(0);
        let result = retry(RetryPolicy::default(), "noop", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42u32) }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(1),
            backoff: 1.0,
        };
        let result = retry(policy, "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(HarnessError::ElementNotFound {
                        selector: "//a".into(),
                    })
                } else {
                    Ok("found")
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, "found");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1),
            backoff: 1.0,
        };
        let result: HarnessResult<()> = retry(policy, "doomed", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(HarnessError::ElementNotFound {
                    selector: "//a".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let result: HarnessResult<()> = retry(RetryPolicy::default(), "config", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(HarnessError::InvalidConfig("bad".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wait_until_times_out() {
        let result = wait_until(
            Duration::from_millis(20),
            Duration::from_millis(5),
            "never",
            || async { Ok(false) },
        )
        .await;
        match result {
            Err(HarnessError::Timeout { what, .. }) => assert_eq!(what, "never"),
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn wait_until_passes_when_probe_turns_true() {
        let calls = AtomicU32::new(0);
        wait_until(
            Duration::from_millis(500),
            Duration::from_millis(1),
            "eventually",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 3) }
            },
        )
        .await
        .unwrap();
    }
}
