//! # Execution contexts: where runners execute.
//!
//! An [`ExecutionContext`] is a named pool able to run an async unit of work.
//! Every periodic task runs its whole runner (waits and executions) on one context:
//! its own, or the worker's default.
//!
//! - [`TokioContext`] - a handle onto an existing tokio runtime. The default context
//!   is `TokioContext::current()` named `"io"`, captured explicitly when the worker is built.
//! - [`ComputeContext`] - owns a dedicated multi-thread runtime for CPU-heavy tasks.
//!
//! Contexts may be shared by any number of tasks.

mod compute;
mod execution;

pub use compute::ComputeContext;
pub use execution::{ContextRef, ExecutionContext, TokioContext};
