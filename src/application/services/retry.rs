//! # Retry Policy
//!
//! Bounded retry with a fixed delay between attempts.
//!
//! Only errors that report themselves as [`Retryable`] are tried again.
//! Anything else ends the operation on the attempt that produced it.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use vault_sweeper::application::services::retry::RetryPolicy;
//!
//! let policy = RetryPolicy::new(0, Duration::from_secs(5));
//! assert_eq!(policy.max_attempts(), 1);
//! ```

use crate::infrastructure::blockchain::ChainError;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of attempts per operation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Errors that can tell whether another attempt might succeed.
pub trait Retryable {
    /// Returns true if the failure is transient.
    fn is_retryable(&self) -> bool;
}

impl Retryable for ChainError {
    fn is_retryable(&self) -> bool {
        ChainError::is_retryable(self)
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` is raised to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` under this policy, logging each failed attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Fatal`] on the first non-retryable error, or
    /// [`RetryError::Exhausted`] once every attempt has failed.
    pub async fn run<T, E, F, Fut>(&self, operation: &'static str, op: F) -> Result<Retried<T>, RetryError<E>>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_with_observer(operation, op, |failure| {
            warn!(
                operation = failure.operation,
                attempt = failure.attempt,
                max_attempts = failure.max_attempts,
                will_retry = failure.will_retry,
                "attempt failed: {}",
                failure.error
            );
        })
        .await
    }

    /// Runs `op` under this policy, reporting each failed attempt to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`RetryPolicy::run`].
    pub async fn run_with_observer<T, E, F, Fut, O>(
        &self,
        operation: &'static str,
        mut op: F,
        mut observer: O,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: FnMut(&AttemptFailure<'_, E>),
    {
        let mut attempt: u32 = 1;
        loop {
            let error = match op().await {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            let retryable = error.is_retryable();
            let will_retry = retryable && attempt < self.max_attempts;
            observer(&AttemptFailure {
                operation,
                attempt,
                max_attempts: self.max_attempts,
                error: &error,
                will_retry,
            });

            if !retryable {
                return Err(RetryError::Fatal {
                    operation,
                    attempt,
                    error,
                });
            }
            if !will_retry {
                return Err(RetryError::Exhausted {
                    operation,
                    attempts: attempt,
                    last: error,
                });
            }

            tokio::time::sleep(self.delay).await;
            attempt = attempt.saturating_add(1);
        }
    }
}

/// A failed attempt, as seen by an observer.
#[derive(Debug)]
pub struct AttemptFailure<'a, E> {
    /// Name of the operation being retried.
    pub operation: &'static str,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Attempts allowed by the policy.
    pub max_attempts: u32,
    /// The error this attempt produced.
    pub error: &'a E,
    /// Whether another attempt follows.
    pub will_retry: bool,
}

/// A successful result and how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    /// The operation's result.
    pub value: T,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a transient error.
    Exhausted {
        /// Operation name.
        operation: &'static str,
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: E,
    },
    /// A non-retryable error ended the operation early.
    Fatal {
        /// Operation name.
        operation: &'static str,
        /// Attempt that failed.
        attempt: u32,
        /// The error.
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Fatal { attempt, .. } => *attempt,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                operation,
                attempts,
                last,
            } => write!(f, "{operation} failed after {attempts} attempts: {last}"),
            Self::Fatal {
                operation, error, ..
            } => write!(f, "{operation} failed: {error}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}
