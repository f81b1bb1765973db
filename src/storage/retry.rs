//! Retry policies for object storage calls.

use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio_retry::RetryIf;

use crate::error_handling::StorageError;

/// Decides whether a failed storage call is worth another attempt.
pub trait RetryPolicy: Send + Sync {
    fn should_retry(&self, error: &StorageError) -> bool;
}

/// Retries throttling, server errors and transport timeouts.
///
/// Only [`StorageError::Transport`] messages are inspected for timeouts.
/// A reset connection is not retried here; wrap with
/// [`ConnectionResetRetry`] for that.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, error: &StorageError) -> bool {
        match error {
            StorageError::Status { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
            StorageError::Transport { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("timed out") || message.contains("timeout")
            }
            StorageError::Setup(_) | StorageError::Client { .. } => false,
        }
    }
}

/// Retries `connection reset` transport failures on top of `P`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectionResetRetry<P> {
    inner: P,
}

impl<P: RetryPolicy> ConnectionResetRetry<P> {
    pub fn new(inner: P) -> Self {
        ConnectionResetRetry { inner }
    }
}

impl<P: RetryPolicy> RetryPolicy for ConnectionResetRetry<P> {
    fn should_retry(&self, error: &StorageError) -> bool {
        if let StorageError::Transport { message, .. } = error {
            if message.to_ascii_lowercase().contains("connection reset") {
                return true;
            }
        }
        self.inner.should_retry(error)
    }
}

/// Runs `action`, retrying after each delay of `strategy` while `policy`
/// accepts the error.
pub async fn with_retry<T, S, A, Fut>(
    strategy: S,
    policy: &dyn RetryPolicy,
    action: A,
) -> Result<T, StorageError>
where
    S: IntoIterator<Item = Duration>,
    A: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    RetryIf::start(strategy, action, |error: &StorageError| {
        let retry = policy.should_retry(error);
        if retry {
            warn!("Retrying storage call after error: {error}");
        }
        retry
    })
    .await
}
