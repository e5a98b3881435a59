//! Transaction execution strategy.
//!
//! Every core operation runs inside one store transaction obtained here.
//! An attempt is bounded by a timeout; transient failures (serialization
//! aborts, timeouts, storage outages) restart the whole attempt with
//! exponential backoff. Anything else is returned to the caller unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BookingConfig;
use crate::domain::foundation::{BookingError, TransientReason};
use crate::ports::{BookingStore, BookingTransaction, IsolationLevel, StoreError, StoreErrorKind};

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err.kind {
            StoreErrorKind::SerializationFailure => {
                BookingError::transient(TransientReason::SerializationFailure, err.message)
            }
            StoreErrorKind::Unavailable => BookingError::transient(TransientReason::Unavailable, err.message),
            StoreErrorKind::ConstraintViolation => {
                BookingError::conflict("The request conflicts with a concurrent change; reload and try again")
            }
            StoreErrorKind::MissingRow | StoreErrorKind::Corrupt | StoreErrorKind::Other => {
                tracing::error!(kind = %err.kind, error = %err.message, "Booking store failure");
                BookingError::Internal
            }
        }
    }
}

/// Exponential backoff between transaction attempts.
///
/// `delay = initial_delay * multiplier^attempt`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.retry_initial_delay(),
            max_delay: config.retry_max_delay(),
            multiplier: config.retry_multiplier,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        if !delay_ms.is_finite() || delay_ms >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }
        Duration::from_millis(delay_ms as u64)
    }
}

/// Runs closures inside store transactions with timeout and retry.
///
/// The closure receives a fresh transaction per attempt and is responsible
/// for committing it. Returning early (or being cancelled by the timeout)
/// drops the transaction, which rolls it back.
///
/// ```ignore
/// let reservation = runner
///     .run("create_reservation", IsolationLevel::Serializable, |mut tx| async move {
///         let reservation = lifecycle.create(tx.as_mut(), member_id, &space_id, window, now).await?;
///         tx.commit().await?;
///         Ok(reservation)
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct TransactionRunner {
    store: Arc<dyn BookingStore>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl TransactionRunner {
    pub fn new(store: Arc<dyn BookingStore>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self { store, retry, timeout }
    }

    pub fn from_config(store: Arc<dyn BookingStore>, config: &BookingConfig) -> Self {
        Self::new(store, RetryPolicy::from_config(config), config.transaction_timeout())
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Runs `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. The last error is returned in the latter two cases.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        isolation: IsolationLevel,
        mut attempt_fn: F,
    ) -> Result<T, BookingError>
    where
        F: FnMut(Box<dyn BookingTransaction>) -> Fut,
        Fut: Future<Output = Result<T, BookingError>>,
    {
        let mut attempt = 0usize;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.attempt(isolation, &mut attempt_fn)).await {
                Ok(result) => result,
                Err(_) => Err(BookingError::transient(
                    TransientReason::Timeout,
                    format!("{} did not finish within {}ms", operation, self.timeout.as_millis()),
                )),
            };

            match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(operation, attempt, "Transaction succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying transaction"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        tracing::warn!(operation, attempts = attempt + 1, error = %err, "Retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt<T, F, Fut>(&self, isolation: IsolationLevel, attempt_fn: &mut F) -> Result<T, BookingError>
    where
        F: FnMut(Box<dyn BookingTransaction>) -> Fut,
        Fut: Future<Output = Result<T, BookingError>>,
    {
        let tx = self.store.begin(isolation).await?;
        attempt_fn(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryBookingStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2.0,
        }
    }

    fn runner(store: InMemoryBookingStore, max_retries: usize) -> TransactionRunner {
        TransactionRunner::new(Arc::new(store), fast_policy(max_retries), Duration::from_millis(200))
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(150),
            multiplier: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(25));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(150));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(150));
    }

    #[test]
    fn policy_follows_config() {
        let policy = RetryPolicy::from_config(&BookingConfig::default());
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn store_errors_map_onto_taxonomy() {
        let err: BookingError = StoreError::serialization_failure("40001").into();
        assert!(err.is_serialization_failure());

        let err: BookingError = StoreError::unavailable("pool timed out").into();
        assert!(matches!(
            err,
            BookingError::Transient {
                reason: TransientReason::Unavailable,
                ..
            }
        ));

        let err: BookingError = StoreError::constraint_violation("reservations_no_overlap").into();
        assert!(matches!(err, BookingError::Conflict { .. }));

        let err: BookingError = StoreError::corrupt("bad status").into();
        assert_eq!(err, BookingError::Internal);
        assert!(!err.to_string().contains("bad status"));
    }

    #[tokio::test]
    async fn commits_on_first_success() {
        let store = InMemoryBookingStore::new();
        let result = runner(store.clone(), 3)
            .run("noop", IsolationLevel::Serializable, |tx| async move {
                tx.commit().await?;
                Ok(7)
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(store.committed(), 1);
    }

    #[tokio::test]
    async fn retries_transient_commit_failures() {
        let store = InMemoryBookingStore::new();
        store.fail_next_commit(StoreError::serialization_failure("injected"));
        store.fail_next_commit(StoreError::serialization_failure("injected"));
        let attempts = AtomicUsize::new(0);

        let result = runner(store.clone(), 3)
            .run("retry", IsolationLevel::Serializable, |tx| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    tx.commit().await?;
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(store.committed(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let store = InMemoryBookingStore::new();
        for _ in 0..5 {
            store.fail_next_commit(StoreError::unavailable("down"));
        }
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = runner(store.clone(), 2)
            .run("exhaust", IsolationLevel::ReadCommitted, |tx| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    tx.commit().await?;
                    Ok(())
                }
            })
            .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(store.committed(), 0);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let store = InMemoryBookingStore::new();
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = runner(store, 3)
            .run("fail", IsolationLevel::Serializable, |_tx| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err(BookingError::conflict("taken")) }
            })
            .await;

        assert!(matches!(result, Err(BookingError::Conflict { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempt_times_out_as_transient() {
        let store = InMemoryBookingStore::new();
        let runner = TransactionRunner::new(
            Arc::new(store.clone()),
            RetryPolicy::none(),
            Duration::from_millis(20),
        );

        let result: Result<(), _> = runner
            .run("slow", IsolationLevel::Serializable, |tx| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                tx.commit().await?;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(BookingError::Transient {
                reason: TransientReason::Timeout,
                ..
            })
        ));
        assert_eq!(store.committed(), 0);
    }
}
