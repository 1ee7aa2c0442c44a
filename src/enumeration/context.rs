/// Cancellation and deadline handling for enumeration work
///
/// Every suspension point in the orchestrator (provider calls and retry
/// pauses) is raced against an `EnumerationContext`, so a cancelled parent
/// or an elapsed deadline stops the work promptly.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Reason a context stopped accepting work
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation token plus an optional deadline
///
/// Children created with [`EnumerationContext::child_with_timeout`] are
/// cancelled together with their parent, but their own deadline never
/// affects the parent or any sibling.
#[derive(Debug, Clone, Default)]
pub struct EnumerationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl EnumerationContext {
    /// A context with no deadline that is only cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, typically a child of the server's shutdown token
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child scoped to `timeout` from now.
    ///
    /// The child inherits cancellation from `self` but not its deadline.
    /// A timeout too large to represent leaves the child without a deadline.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    ///
    /// `fut` is dropped on cancellation, which is how in-flight provider
    /// calls (and the child processes they own) are aborted.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = fut => Ok(output),
        }
    }

    /// Sleep for `duration`, waking early if the context finishes
    pub async fn sleep(&self, duration: Duration) -> Result<(), ContextError> {
        self.run(tokio::time::sleep(duration)).await
    }
}
