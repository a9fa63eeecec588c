//! # Retry Executor
//!
//! Runs a fallible async operation up to [`RetryPolicy::max_attempts`] times,
//! sleeping [`RetryPolicy::backoff_delay`] between attempts.
//!
//! Only transient failures ([`CatalogError::is_transient`]) are retried.
//! Anything else is returned after one attempt. When the cancellation token
//! fires before the first attempt, during an attempt, or during a backoff
//! sleep, the executor stops and returns [`CatalogError::Cancelled`].

use std::future::Future;

use modelgate_core::RetryPolicy;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::{CatalogError, CatalogResult};

/// Run `op` under `policy`, honouring `cancel`.
///
/// `op` receives the 1-based attempt number. After the last attempt the final
/// transient error is returned unchanged.
pub async fn execute<T, F, Fut>(
    mut op: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> CatalogResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CatalogResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CatalogError::Cancelled),
            result = op(attempt) => result,
        };

        let err = match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_transient() || attempt >= max_attempts {
            return Err(err);
        }

        let delay = policy.backoff_delay(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            kind = err.kind(),
            error = %err,
            "transient catalog failure, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CatalogError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use modelgate_core::ValidationError;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn server_error() -> CatalogError {
        CatalogError::HttpStatus {
            status: 500,
            body: "Server error".into(),
        }
    }

    fn policy(max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
        RetryPolicy::new(max_attempts, base_delay_ms, 2.0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_are_exact() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();

        let recorded = stamps.clone();
        let value = execute(
            move |attempt| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().push(Instant::now());
                    if attempt < 3 {
                        Err(server_error())
                    } else {
                        Ok("catalog")
                    }
                }
            },
            &policy(3, 1000),
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(value, "catalog");
        let stamps = stamps.lock();
        assert_eq!(stamps.len(), 3);
        assert_eq!((stamps[1] - stamps[0]).as_millis(), 1000);
        assert_eq!((stamps[2] - stamps[1]).as_millis(), 2000);
        assert!(stamps[2] - stamps[0] >= Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn first_success_needs_one_attempt() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = execute(
            |_| {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, CatalogError>(7) }
            },
            &policy(3, 1),
            &cancel,
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error_unchanged() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let err = execute(
            |attempt| {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err::<(), _>(CatalogError::HttpStatus {
                        status: 500 + u16::try_from(attempt).unwrap(),
                        body: String::new(),
                    })
                }
            },
            &policy(3, 10),
            &cancel,
        )
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_matches!(err, CatalogError::HttpStatus { status: 503, .. });
    }

    #[tokio::test]
    async fn validation_error_not_retried() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let err = execute(
            |_| {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(CatalogError::Validation(ValidationError::missing(
                        "data[0].id",
                        "string",
                    )))
                }
            },
            &policy(5, 1),
            &cancel,
        )
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_matches!(err, CatalogError::Validation(_));
    }

    #[tokio::test]
    async fn pre_cancelled_makes_no_attempt() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = execute(
            |_| {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, CatalogError>(()) }
            },
            &policy(3, 1),
            &cancel,
        )
        .await
        .unwrap_err();
        assert_matches!(err, CatalogError::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_backoff_stops_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        let _canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let counter = calls.clone();
        let started = Instant::now();
        let err = execute(
            move |_| {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(server_error()) }
            },
            &policy(3, 1000),
            &cancel,
        )
        .await
        .unwrap_err();

        assert_matches!(err, CatalogError::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_attempt_aborts_it() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let _canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = execute(
            |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, CatalogError>(())
            },
            &policy(3, 1000),
            &cancel,
        )
        .await
        .unwrap_err();
        assert_matches!(err, CatalogError::Cancelled);
    }
}
