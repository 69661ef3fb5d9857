//! # Periodic task abstractions.
//!
//! - [`Action`] - trait for the async, zero-argument work a task repeats
//! - [`ActionFn`] - closure-backed action implementation
//! - [`ActionRef`] - shared reference to an action (`Arc<dyn Action>`)
//! - [`PeriodicTask`] - immutable record: period, on-start flag, context, action
//! - [`PeriodicTaskBuilder`] - fluent, validating constructor for [`PeriodicTask`]
//! - [`TaskId`] - registration position of a task

mod action;
mod action_fn;
mod spec;

pub use action::{Action, ActionRef};
pub use action_fn::ActionFn;
pub use spec::{PeriodicTask, PeriodicTaskBuilder, TaskId};
