//! Uniform bounded-retry policy for API calls.

use crate::error::{GeminiError, GeminiResult};
use backon::{ConstantBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry applied to every API call.
///
/// Each call waits the same delay between attempts regardless of the error,
/// then gives up after `max_attempts` total tries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn builder(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Run `operation` under `policy`, logging each retry.
///
/// Exhaustion wraps the final error in [`GeminiError::RetriesExhausted`] so
/// callers can tell "failed despite retries" apart from a single failure.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    operation: F,
) -> GeminiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GeminiResult<T>>,
{
    operation
        .retry(policy.builder())
        .notify(|err: &GeminiError, delay: Duration| {
            warn!("{} failed, retrying in {:?}: {}", what, delay, err);
        })
        .await
        .map_err(|e| GeminiError::RetriesExhausted {
            attempts: policy.max_attempts,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };
        let attempts = AtomicU32::new(0);
        let started = Instant::now();

        let result = with_retry(&policy, "test call", || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    Err(GeminiError::ApiError {
                        status: 503,
                        message: "overloaded".to_string(),
                    })
                } else {
                    Ok("done".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Two waits between the three attempts.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempt_count() {
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(5),
        };
        let attempts = AtomicU32::new(0);

        let result: GeminiResult<String> = with_retry(&policy, "test call", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(GeminiError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        match result {
            Err(GeminiError::RetriesExhausted { attempts, message }) => {
                assert_eq!(attempts, 2);
                assert!(message.contains("boom"));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_success_skips_retries() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result = with_retry(&policy, "test call", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(42u32) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
