//! # Periodic task record.
//!
//! [`PeriodicTask`] describes **what** to repeat and **how often**:
//! - `period`: fixed delay between the end of one run and the start of the next (`> 0`)
//! - `runs_on_start`: run once immediately when the worker starts
//! - `context`: execution context (`None` = the worker's default)
//! - `action`: the work itself
//!
//! The record is immutable and validated at construction, so a registered task
//! always has a positive period.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{ActionFn, PeriodicTask, TaskError};
//!
//! let task = PeriodicTask::builder(Duration::from_secs(30))
//!     .named("cache-sweep")
//!     .runs_on_start(true)
//!     .build(ActionFn::arc(|| async { Ok::<_, TaskError>(()) }))
//!     .unwrap();
//!
//! assert_eq!(task.name(), "cache-sweep");
//! assert!(task.runs_on_start());
//! assert!(task.context().is_none());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::context::ContextRef;
use crate::error::RegistrationError;
use crate::tasks::action::ActionRef;

/// Registration position of a task (0-based, insertion order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Position of the task in the registry.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable periodic task definition.
#[derive(Clone)]
pub struct PeriodicTask {
    name: Cow<'static, str>,
    period: Duration,
    runs_on_start: bool,
    context: Option<ContextRef>,
    action: ActionRef,
}

impl PeriodicTask {
    /// Label used when no name is given.
    pub const DEFAULT_NAME: &'static str = "periodic";

    /// Creates a task with default options (no immediate run, default context).
    pub fn new(period: Duration, action: ActionRef) -> Result<Self, RegistrationError> {
        Self::builder(period).build(action)
    }

    /// Starts a fluent builder.
    pub fn builder(period: Duration) -> PeriodicTaskBuilder {
        PeriodicTaskBuilder::new(period)
    }

    /// Human-readable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed delay between runs.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the task runs once before its first wait.
    pub fn runs_on_start(&self) -> bool {
        self.runs_on_start
    }

    /// Dedicated execution context, if any.
    pub fn context(&self) -> Option<&ContextRef> {
        self.context.as_ref()
    }

    /// The action.
    pub fn action(&self) -> &ActionRef {
        &self.action
    }
}

impl fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("runs_on_start", &self.runs_on_start)
            .field("context", &self.context.as_ref().map(|c| c.name()))
            .finish_non_exhaustive()
    }
}

/// Builder for [`PeriodicTask`].
#[derive(Clone)]
pub struct PeriodicTaskBuilder {
    name: Cow<'static, str>,
    period: Duration,
    runs_on_start: bool,
    context: Option<ContextRef>,
}

impl PeriodicTaskBuilder {
    /// Creates a new builder for the given period.
    pub fn new(period: Duration) -> Self {
        Self {
            name: Cow::Borrowed(PeriodicTask::DEFAULT_NAME),
            period,
            runs_on_start: false,
            context: None,
        }
    }

    /// Sets the label used in reports.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Runs the action once as soon as the worker starts.
    pub fn runs_on_start(mut self, yes: bool) -> Self {
        self.runs_on_start = yes;
        self
    }

    /// Runs the task on a dedicated execution context.
    pub fn on(mut self, context: ContextRef) -> Self {
        self.context = Some(context);
        self
    }

    /// Validates the period and builds the task.
    pub fn build(self, action: ActionRef) -> Result<PeriodicTask, RegistrationError> {
        if self.period.is_zero() {
            return Err(RegistrationError::InvalidPeriod {
                period: self.period,
            });
        }
        Ok(PeriodicTask {
            name: self.name,
            period: self.period,
            runs_on_start: self.runs_on_start,
            context: self.context,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::ActionFn;

    fn noop() -> ActionRef {
        ActionFn::arc(|| async { Ok::<_, TaskError>(()) })
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let err = PeriodicTask::new(Duration::ZERO, noop()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidPeriod {
                period: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_defaults() {
        let task = PeriodicTask::new(Duration::from_millis(1), noop()).unwrap();
        assert_eq!(task.name(), PeriodicTask::DEFAULT_NAME);
        assert_eq!(task.period(), Duration::from_millis(1));
        assert!(!task.runs_on_start());
        assert!(task.context().is_none());
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId(4).to_string(), "#4");
        assert_eq!(TaskId(4).index(), 4);
    }
}
