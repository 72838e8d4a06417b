//! Retry with exponential backoff
//!
//! One primitive shared by connection establishment and uploads. Attempt `n`
//! that fails with a retryable error is followed by a sleep of
//! `initial_delay * 2^(n-1)`; there is no sleep after the last attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and base delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is raised to at least one
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Sleep that follows failed attempt `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Why a retried operation gave up
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made before giving up
    pub attempts: u32,

    /// Error of the last attempt
    pub last_error: E,

    /// `true` when the attempt budget ran out, `false` when the predicate
    /// rejected the error
    pub exhausted: bool,
}

/// Run `attempt_fn` until it succeeds, the policy is exhausted, or
/// `is_retryable` rejects an error
///
/// `attempt_fn` receives the 1-based attempt number. `resource` names what
/// the operation acts on (a file path, a database address) and is attached
/// to every failure event.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    resource: &str,
    is_retryable: P,
    mut attempt_fn: F,
) -> Result<T, RetryFailure<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_retryable(&e) {
                    tracing::error!(
                        operation,
                        resource,
                        attempt,
                        error = %e,
                        "Attempt failed with a non-retryable error"
                    );
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: e,
                        exhausted: false,
                    });
                }

                if attempt >= policy.max_attempts {
                    tracing::error!(
                        operation,
                        resource,
                        attempts = attempt,
                        error = %e,
                        "All attempts failed"
                    );
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: e,
                        exhausted: true,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                crate::log_retry_attempt!(
                    operation,
                    resource,
                    attempt,
                    policy.max_attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
