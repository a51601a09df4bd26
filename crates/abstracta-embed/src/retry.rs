//! Bounded fixed-interval retry for embedding-service calls.

use std::future::Future;
use std::time::Duration;

use abstracta_common::settings::EmbeddingSettings;
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    pub fn from_settings(cfg: &EmbeddingSettings) -> Self {
        Self::new(cfg.max_retries, Duration::from_secs(cfg.retry_backoff_secs))
    }
}

/// Run `op` until it succeeds, it fails with a non-transient error, or
/// `max_retries` retries have been spent. The last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retries < policy.max_retries => {
                retries += 1;
                warn!(
                    error = %e,
                    retry = retries,
                    max_retries = policy.max_retries,
                    backoff_secs = policy.backoff.as_secs(),
                    "{what} failed (the embedding server is often just busy); waiting before retrying"
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn busy() -> EmbedError {
        EmbedError::Service { status: 503, message: "server busy".into() }
    }

    /// Fails `failures` times, then succeeds; counts every call.
    async fn flaky(calls: &AtomicU32, failures: u32) -> Result<&'static str> {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < failures { Err(busy()) } else { Ok("stored") }
    }

    const POLICY: RetryPolicy = RetryPolicy { max_retries: 5, backoff: Duration::ZERO };

    #[tokio::test]
    async fn test_four_failures_then_success_takes_five_attempts() {
        let calls = AtomicU32::new(0);
        let out = retry_with_backoff(POLICY, "add", || flaky(&calls, 4)).await.unwrap();
        assert_eq!(out, "stored");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_six_failures_raise_after_fifth_retry() {
        let calls = AtomicU32::new(0);
        let err = retry_with_backoff(POLICY, "add", || flaky(&calls, 6)).await.unwrap_err();
        assert!(matches!(err, EmbedError::Service { status: 503, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = retry_with_backoff(POLICY, "add", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(EmbedError::EmptyEmbedding)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, EmbedError::EmptyEmbedding));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
