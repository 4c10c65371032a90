//! Ambient cancellation and deadline for a describe call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{DescribeError, Result};

/// Cancellation token plus optional deadline, shared by every catalog query of
/// one describe call.
///
/// The deadline is fixed when the timeout is set, so all three catalog queries
/// draw from the same budget.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl QueryContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing token, typically one cancelled by a signal handler.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Expire `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    /// Like [`with_timeout`](Self::with_timeout), skipping `None`.
    pub fn with_optional_timeout(self, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(t) => self.with_timeout(t),
            None => self,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast if the context is already cancelled or past its deadline.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(DescribeError::Cancelled);
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DescribeError::Timeout(timeout));
            }
        }
        Ok(())
    }

    /// Drive `fut` unless the context is cancelled or the deadline passes first.
    ///
    /// Cancellation is checked before the future is polled, so a cancelled
    /// context never starts a query. Dropping `fut` releases any pooled
    /// connection it holds.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let guarded = async {
            match self.deadline {
                Some((deadline, timeout)) => {
                    match tokio::time::timeout_at(deadline, fut).await {
                        Ok(result) => result,
                        Err(_elapsed) => Err(DescribeError::Timeout(timeout)),
                    }
                }
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DescribeError::Cancelled),
            result = guarded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = QueryContext::new();
        let value = ctx.run(async { Ok::<_, DescribeError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_polls_future() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = QueryContext::new().with_cancel_token(token);

        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<_, DescribeError>(())
            })
            .await;

        assert!(matches!(result, Err(DescribeError::Cancelled)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let ctx = QueryContext::new();
        let token = ctx.cancel_token().clone();

        let handle = tokio::spawn(async move {
            ctx.run(std::future::pending::<Result<()>>()).await
        });
        token.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(DescribeError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = QueryContext::new().with_timeout(Duration::from_secs(5));
        let result = ctx.run(std::future::pending::<Result<()>>()).await;
        match result {
            Err(DescribeError::Timeout(t)) => assert_eq!(t, Duration::from_secs(5)),
            other => panic!("expected timeout, got {:?}", other),
        }
        // budget is spent for later queries too
        assert!(matches!(ctx.check(), Err(DescribeError::Timeout(_))));
    }
}
