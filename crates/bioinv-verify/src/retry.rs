//! Retry with exponential back-off for URL liveness checks.
//!
//! [`retry_with_backoff`] wraps a fallible async operation and retries on
//! transient network errors. Any HTTP response — success or failure status —
//! resolves the operation and is never retried; only requests that failed to
//! complete at all are worth another attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::CheckError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** [`CheckError::Http`] — the request never completed (DNS
/// failure, connection refused, timeout, TLS error).
///
/// **Not retriable:** [`CheckError::InvalidUrl`] — reparsing won't fix it.
pub(crate) fn is_retriable(err: &CheckError) -> bool {
    matches!(err, CheckError::Http(_))
}

/// Runs `operation` up to `num_tries` total attempts, sleeping between
/// attempts on transient errors.
///
/// The wait before attempt k (k >= 2) is `backoff_factor * 2^(k-2)` seconds:
/// the first retry waits `backoff_factor`, doubling each attempt after that.
/// A `backoff_factor` of zero retries immediately. Waits beyond an hour are
/// clamped (only reachable with extreme configurations).
///
/// Non-retriable errors are returned immediately; once attempts are
/// exhausted the last error observed is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    num_tries: u32,
    backoff_factor: f64,
    mut operation: F,
) -> Result<T, CheckError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CheckError>>,
{
    const MAX_BACKOFF: Duration = Duration::from_secs(3_600);

    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= num_tries {
                    return Err(err);
                }
                let delay = backoff_delay(backoff_factor, attempt).min(MAX_BACKOFF);
                tracing::debug!(
                    attempt,
                    num_tries,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "transient network error — retrying after back-off"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}

/// Wait after the `attempt`-th failed attempt (1-based):
/// `backoff_factor * 2^(attempt-1)` seconds.
fn backoff_delay(backoff_factor: f64, attempt: u32) -> Duration {
    #[allow(clippy::cast_possible_wrap)]
    let secs = backoff_factor * 2f64.powi((attempt - 1) as i32);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn invalid_url_err() -> CheckError {
        CheckError::InvalidUrl {
            url: "adflkbndijfbn".to_owned(),
            reason: "relative URL without a base".to_owned(),
        }
    }

    async fn connect_error() -> CheckError {
        // A connect to a reserved unroutable port produces a real
        // network-level reqwest error.
        let err = reqwest::Client::new()
            .head("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        CheckError::Http(err)
    }

    #[test]
    fn invalid_url_is_not_retriable() {
        assert!(!is_retriable(&invalid_url_err()));
    }

    #[tokio::test]
    async fn network_error_is_retriable() {
        let err = connect_error().await;
        assert!(is_retriable(&err));
    }

    #[test]
    fn backoff_schedule_doubles_from_factor() {
        assert_eq!(backoff_delay(0.5, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(0.5, 2), Duration::from_secs(1));
        assert_eq!(backoff_delay(0.5, 3), Duration::from_secs(2));
        assert_eq!(backoff_delay(2.0, 4), Duration::from_secs(16));
    }

    #[test]
    fn zero_factor_means_zero_wait() {
        for attempt in 1..=8 {
            assert_eq!(backoff_delay(0.0, attempt), Duration::ZERO);
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0.0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, CheckError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permanent_network_failure_uses_every_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(4, 0.0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, CheckError>(connect_error().await)
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            4,
            "num_tries=4 must mean exactly 4 attempts"
        );
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0.0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(connect_error().await)
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_invalid_url() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0.0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, CheckError>(invalid_url_err())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(CheckError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn single_try_never_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(1, 0.0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, CheckError>(connect_error().await)
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
