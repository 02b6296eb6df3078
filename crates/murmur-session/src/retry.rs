//! Caller-side retry for session operations.
//!
//! The manager never retries on its own; callers that want joins retried on
//! a flaky transport wrap the call in [`retry`].

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::SessionError;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never below 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after each retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Single attempt.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_millis(250))
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, SessionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SessionError>>,
{
    let mut attempt = 1;
    let mut delay = policy.backoff;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    %err,
                    "Retrying in {:?}", delay
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::transport::TransportError;

    #[tokio::test]
    async fn retries_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry(RetryPolicy::new(3, Duration::ZERO), || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(SessionError::TransportUnavailable)
            } else {
                Ok("joined")
            }
        })
        .await;
        assert_eq!(result, Ok("joined"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry(RetryPolicy::new(2, Duration::ZERO), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SessionError::TransportUnavailable)
        })
        .await;
        assert_eq!(result, Err(SessionError::TransportUnavailable));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = SessionError::JoinFailed("team".into(), TransportError::Rejected("full".into()));
        let expected = &err;
        let result: Result<(), _> = retry(RetryPolicy::new(5, Duration::ZERO), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(expected.clone())
        })
        .await;
        assert_eq!(result, Err(err.clone()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn default_policy_is_single_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _ = retry(RetryPolicy::default(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(SessionError::TransportUnavailable)
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
