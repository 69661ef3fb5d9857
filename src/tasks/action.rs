//! # Action abstraction.
//!
//! An [`Action`] is the unit of work a periodic task repeats. It takes no
//! arguments, may suspend internally (I/O, timers) and reports failure through
//! its `Result`. Failures and panics are contained by the runner.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// Shared handle to an action.
pub type ActionRef = Arc<dyn Action>;

/// # Asynchronous periodic unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tickvisor::{Action, TaskError};
///
/// struct PurgeSessions;
///
/// #[async_trait]
/// impl Action for PurgeSessions {
///     async fn run(&self) -> Result<(), TaskError> {
///         // delete expired sessions...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Executes the action once.
    async fn run(&self) -> Result<(), TaskError>;
}
