//! # Runtime events emitted by the worker and its runners.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Worker events**: start, empty registry, stop, join results
//! - **Runner events**: spawn, run start/finish/failure, next tick, cancellation
//! - **Lifecycle events**: host signals that arrived out of order
//! - **Subscriber events**: overflow and panics of subscriber workers
//!
//! The [`Event`] struct carries metadata such as timestamps, task identity,
//! execution phase, run numbers and error text.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{Event, EventKind, Phase};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("cleanup")
//!     .with_task_id(2)
//!     .with_phase(Phase::Periodic)
//!     .with_run(3)
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("cleanup"));
//! assert_eq!(ev.error.as_deref(), Some("boom"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `error` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `error` ("full" / "closed").
    SubscriberOverflow,

    /// The listener fell behind the bus ring buffer and skipped events.
    ///
    /// Only per-run chatter can be skipped; reports never travel on the ring.
    /// Sets: `count` (events skipped).
    BusLagged,

    // === Worker events ===
    /// Worker processed the start signal.
    ///
    /// Sets: `count` (runners spawned).
    WorkerStarted,

    /// Start signal arrived with an empty registry. Emitted once.
    NoTasksRegistered,

    /// Stop signal processed; every runner token was cancelled.
    ///
    /// Sets: `count` (runners cancelled).
    StopRequested,

    /// Joining shutdown: every runner exited within the grace period.
    AllStoppedWithin,

    /// Joining shutdown: grace period exceeded; stragglers were aborted.
    ///
    /// Sets: `timeout_ms` (grace), `error` (stuck task names).
    GraceExceeded,

    /// A host signal arrived in an unexpected order and was ignored.
    ///
    /// Sets: `error` (lifecycle error label).
    LifecycleIgnored,

    // === Runner events ===
    /// Runner spawned on its execution context.
    ///
    /// Sets: `task`, `task_id`, `context`, `period_ms`.
    RunnerSpawned,

    /// Runner could not be spawned; other runners are unaffected.
    ///
    /// Sets: `task`, `task_id`, `context`, `error`.
    SpawnFailed,

    /// Action execution is starting.
    ///
    /// Sets: `task`, `task_id`, `context`, `phase`, `run`.
    TaskStarting,

    /// Action execution finished successfully.
    ///
    /// Sets: `task`, `task_id`, `context`, `phase`, `run`.
    TaskSucceeded,

    /// Action execution failed (error or panic); the runner keeps ticking.
    ///
    /// Sets: `task`, `task_id`, `context`, `phase`, `run`, `error`.
    TaskFailed,

    /// Next run armed after the previous one completed.
    ///
    /// Sets: `task`, `task_id`, `delay_ms`, `run` (last completed run).
    RunScheduled,

    /// Runner observed cancellation and exited.
    ///
    /// Sets: `task`, `task_id`, `run` (completed runs).
    RunnerCancelled,
}

impl EventKind {
    /// Returns `true` for events that must reach subscribers even under load:
    /// failures, warnings and worker-level transitions.
    ///
    /// The bus delivers these on an unbounded queue instead of
    /// the lossy ring buffer.
    pub fn is_report(self) -> bool {
        matches!(
            self,
            EventKind::TaskFailed
                | EventKind::SpawnFailed
                | EventKind::GraceExceeded
                | EventKind::SubscriberPanicked
                | EventKind::NoTasksRegistered
                | EventKind::LifecycleIgnored
                | EventKind::WorkerStarted
                | EventKind::StopRequested
                | EventKind::AllStoppedWithin
        )
    }
}

/// Which branch of the runner produced a run event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The optional run performed before the first wait.
    Immediate,
    /// A regular run after a full period of waiting.
    Periodic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Immediate => f.write_str("on-start"),
            Phase::Periodic => f.write_str("periodic"),
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task name (or subscriber name for subscriber events).
    pub task: Option<Arc<str>>,
    /// Registration position of the task.
    pub task_id: Option<usize>,
    /// Name of the execution context the task runs on.
    pub context: Option<Arc<str>>,
    /// Execution branch for run events.
    pub phase: Option<Phase>,
    /// Run number (1-based, per task; the immediate run counts).
    pub run: Option<u64>,
    /// Generic counter (runners spawned/cancelled).
    pub count: Option<usize>,
    /// Task period in milliseconds (compact).
    pub period_ms: Option<u32>,
    /// Delay before the next run in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Grace/timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable error or reason.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            task_id: None,
            context: None,
            phase: None,
            run: None,
            count: None,
            period_ms: None,
            delay_ms: None,
            timeout_ms: None,
            error: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the registration position of the task.
    #[inline]
    pub fn with_task_id(mut self, id: usize) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches the execution context name.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Arc<str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches the execution phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a run number.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches a counter.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a period (stored as milliseconds).
    #[inline]
    pub fn with_period(mut self, d: Duration) -> Self {
        self.period_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an error or reason.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_error(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_error(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskSucceeded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_durations_saturate_to_u32_millis() {
        let ev = Event::new(EventKind::RunScheduled)
            .with_delay(Duration::from_millis(1500))
            .with_period(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(1500));
        assert_eq!(ev.period_ms, Some(u32::MAX));
    }

    #[test]
    fn test_failures_are_reports_and_chatter_is_not() {
        assert!(EventKind::TaskFailed.is_report());
        assert!(EventKind::SpawnFailed.is_report());
        assert!(EventKind::NoTasksRegistered.is_report());
        assert!(!EventKind::TaskStarting.is_report());
        assert!(!EventKind::TaskSucceeded.is_report());
        assert!(!EventKind::RunScheduled.is_report());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Immediate.to_string(), "on-start");
        assert_eq!(Phase::Periodic.to_string(), "periodic");
    }
}
