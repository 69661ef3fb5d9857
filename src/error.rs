//! Error types used by the tickvisor runtime and by periodic actions.
//!
//! - [`RegistrationError`] - rejected `register` calls (surfaced synchronously).
//! - [`TaskError`] - failures of a single action execution (always contained by the runner).
//! - [`LifecycleError`] - host signals arriving in an unexpected order (never fatal).
//! - [`ContextError`] - execution contexts that cannot be built or used.
//! - [`RuntimeError`] - failures of a joining shutdown.
//!
//! Every enum provides `as_label` (a stable snake_case label for logs/metrics).

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Errors returned by task registration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The period was zero; periodic tasks need a strictly positive period.
    #[error("invalid period {period:?}: must be greater than zero")]
    InvalidPeriod {
        /// The rejected period.
        period: Duration,
    },

    /// The worker already started and the registry is frozen.
    #[error("registry is frozen: tasks cannot be registered after start")]
    Frozen,
}

impl RegistrationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::RegistrationError;
    ///
    /// assert_eq!(RegistrationError::Frozen.as_label(), "registration_frozen");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistrationError::InvalidPeriod { .. } => "registration_invalid_period",
            RegistrationError::Frozen => "registration_frozen",
        }
    }
}

/// # Errors produced by one execution of a periodic action.
///
/// These never stop the task: the runner reports them and waits for the next tick.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The action reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action panicked; the panic was caught at the runner boundary.
    #[error("action panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use tickvisor::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }
}

/// # Unexpected host signal ordering.
///
/// Returned to direct callers of [`PeriodicWorker`](crate::PeriodicWorker) lifecycle methods.
/// When the signal comes through an installed host hook it is only reported.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// Stop requested before the worker was started.
    #[error("worker was not started")]
    NotStarted,

    /// Start requested twice.
    #[error("worker is already running")]
    AlreadyStarted,

    /// Start or stop requested after the worker was stopped.
    #[error("worker was already stopped")]
    AlreadyStopped,

    /// Hooks were already installed into a host lifecycle.
    #[error("worker is already installed into a host lifecycle")]
    AlreadyInstalled,
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::NotStarted => "lifecycle_not_started",
            LifecycleError::AlreadyStarted => "lifecycle_already_started",
            LifecycleError::AlreadyStopped => "lifecycle_already_stopped",
            LifecycleError::AlreadyInstalled => "lifecycle_already_installed",
        }
    }
}

/// # Errors produced by execution contexts.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ContextError {
    /// No tokio runtime is available to capture as the default context.
    #[error("no tokio runtime available in the current thread")]
    NoRuntime,

    /// A dedicated runtime could not be built.
    #[error("failed to build runtime for context {name:?}: {source}")]
    Build {
        /// Context name.
        name: String,
        /// Underlying I/O error from the runtime builder.
        #[source]
        source: std::io::Error,
    },

    /// The context no longer accepts work.
    #[error("context {name:?} is closed")]
    Closed {
        /// Context name.
        name: String,
    },
}

impl ContextError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContextError::NoRuntime => "context_no_runtime",
            ContextError::Build { .. } => "context_build_failed",
            ContextError::Closed { .. } => "context_closed",
        }
    }
}

/// # Errors produced by the worker runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Joining shutdown ran out of grace; the listed tasks were still inside an action and got aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that did not finish in time.
        stuck: Vec<String>,
    },

    /// The worker was not in a state that allows shutdown.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Lifecycle(e) => e.as_label(),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_helper_keeps_message() {
        let err = TaskError::fail(std::io::Error::other("connection refused"));
        assert_eq!(
            err,
            TaskError::Fail {
                error: "connection refused".into()
            }
        );
        assert_eq!(err.as_label(), "task_failed");
    }

    #[test]
    fn test_runtime_error_wraps_lifecycle_label() {
        let err: RuntimeError = LifecycleError::NotStarted.into();
        assert_eq!(err.as_label(), "lifecycle_not_started");
        assert_eq!(err.to_string(), "worker was not started");
    }

    #[test]
    fn test_invalid_period_message() {
        let err = RegistrationError::InvalidPeriod {
            period: Duration::ZERO,
        };
        assert_eq!(err.as_label(), "registration_invalid_period");
        assert!(err.to_string().contains("greater than zero"));
    }
}
