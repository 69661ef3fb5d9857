//! # Function-backed action (`ActionFn`)
//!
//! [`ActionFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per run.
//! If runs need shared state, capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tickvisor::{ActionFn, ActionRef, TaskError};
//!
//! let a: ActionRef = ActionFn::arc(|| async {
//!     // do work...
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = a;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::action::Action;

/// Function-backed action implementation.
#[derive(Debug)]
pub struct ActionFn<F> {
    f: F,
}

impl<F> ActionFn<F> {
    /// Creates a new function-backed action.
    ///
    /// Prefer [`ActionFn::arc`] when you immediately need an [`ActionRef`](crate::ActionRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Action for ActionFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), TaskError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_each_run_creates_fresh_future() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let action = ActionFn::new(move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TaskError::fail("first"))
                } else {
                    Ok(())
                }
            }
        });

        assert!(action.run().await.is_err());
        assert!(action.run().await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
