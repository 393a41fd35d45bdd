use std::{future::Future, pin::Pin};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::RpcError;

// Type alias for registered RPC handlers
pub(crate) type AsyncHandlerFn = Box<
    dyn Fn(Vec<u8>) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, RpcError>> + Send>>
        + Send
        + Sync,
>;

/// Per-call state the server checks before handing a request to its handler.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    pub fn new(deadline: Option<Instant>, cancellation: CancellationToken) -> Self {
        Self {
            deadline,
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns the reason this call must not be dispatched, if any.
    pub fn check(&self) -> Result<(), RpcError> {
        if self.is_cancelled() {
            return Err(RpcError::Cancelled);
        }
        if self.is_expired() {
            return Err(RpcError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn context_without_deadline_is_dispatchable() {
        let ctx = CallContext::new(None, CancellationToken::new());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn cancelled_context_reports_cancelled() {
        let token = CancellationToken::new();
        let ctx = CallContext::new(None, token.clone());
        token.cancel();
        assert!(matches!(ctx.check(), Err(RpcError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_context_reports_deadline_exceeded() {
        let ctx = CallContext::new(
            Some(Instant::now() + Duration::from_millis(10)),
            CancellationToken::new(),
        );
        assert!(ctx.check().is_ok());

        tokio::time::advance(Duration::from_millis(20)).await;
        assert!(matches!(ctx.check(), Err(RpcError::DeadlineExceeded)));
    }
}
