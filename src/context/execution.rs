//! # Execution context trait and the tokio-handle implementation.

use std::borrow::Cow;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::ContextError;

/// Shared reference to an execution context.
pub type ContextRef = Arc<dyn ExecutionContext>;

/// # A named pool able to run asynchronous work.
///
/// Implementations must return promptly from [`spawn`](ExecutionContext::spawn);
/// the returned handle is used by the worker to join or abort the runner.
pub trait ExecutionContext: Send + Sync + 'static {
    /// Stable, human-readable context name (shown in reports).
    fn name(&self) -> &str;

    /// Schedules `fut` on this context.
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<JoinHandle<()>, ContextError>;
}

/// Context backed by a [`tokio::runtime::Handle`].
///
/// ## Example
/// ```rust
/// use tickvisor::{ExecutionContext, TokioContext};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tickvisor::ContextError> {
/// let io = TokioContext::current()?;
/// assert_eq!(io.name(), "io");
///
/// let reports = TokioContext::new("reports", tokio::runtime::Handle::current());
/// assert_eq!(reports.name(), "reports");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TokioContext {
    name: Cow<'static, str>,
    handle: Handle,
}

impl TokioContext {
    /// Name of the default context.
    pub const DEFAULT_NAME: &'static str = "io";

    /// Wraps an explicit runtime handle.
    pub fn new(name: impl Into<Cow<'static, str>>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// Captures the runtime of the calling thread as the `"io"` context.
    pub fn current() -> Result<Self, ContextError> {
        Handle::try_current()
            .map(|handle| Self::new(Self::DEFAULT_NAME, handle))
            .map_err(|_| ContextError::NoRuntime)
    }

    /// Creates the context and returns it as a [`ContextRef`].
    pub fn arc(name: impl Into<Cow<'static, str>>, handle: Handle) -> ContextRef {
        Arc::new(Self::new(name, handle))
    }

    /// The wrapped runtime handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl ExecutionContext for TokioContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<JoinHandle<()>, ContextError> {
        Ok(self.handle.spawn(fut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_without_runtime_fails() {
        let err = TokioContext::current().unwrap_err();
        assert_eq!(err.as_label(), "context_no_runtime");
    }

    #[tokio::test]
    async fn test_spawn_runs_future_on_handle() {
        let ctx = TokioContext::arc("jobs", Handle::current());
        let (tx, rx) = tokio::sync::oneshot::channel();
        let join = ctx
            .spawn(Box::pin(async move {
                let _ = tx.send(42);
            }))
            .unwrap();
        join.await.unwrap();
        assert_eq!(rx.await.unwrap(), 42);
        assert_eq!(ctx.name(), "jobs");
    }
}
