//! # LogWriter - events to `tracing`
//!
//! The default logging sink. Maps each [`Event`] to one `tracing` record:
//!
//! | Event                                   | Level   |
//! |-----------------------------------------|---------|
//! | `TaskFailed`, `SpawnFailed`, `GraceExceeded`, `SubscriberPanicked` | `error` |
//! | `NoTasksRegistered`, `LifecycleIgnored`, `SubscriberOverflow`, `BusLagged` | `warn` |
//! | `WorkerStarted`, `StopRequested`, `AllStoppedWithin`               | `info`  |
//! | runner lifecycle (`RunnerSpawned`, `RunnerCancelled`)              | `debug` |
//! | per-run events (`TaskStarting`, `TaskSucceeded`, `RunScheduled`)   | `trace` |
//!
//! ## Example output (fmt subscriber)
//! ```text
//! WARN tickvisor: no tasks registered
//! ERROR tickvisor: periodic task failed task="cleanup" id=0 context="io" phase=periodic run=3 err="disk full"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "tickvisor";

/// Event writer subscriber backed by `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let err = e.error.as_deref().unwrap_or("-");
        let ctx = e.context.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TaskFailed => {
                let phase = e.phase.map(|p| p.to_string()).unwrap_or_default();
                tracing::error!(
                    target: TARGET,
                    task, id = e.task_id, context = ctx, phase = %phase, run = e.run, err,
                    "{} task failed", phase
                );
            }
            EventKind::SpawnFailed => {
                tracing::error!(target: TARGET, task, id = e.task_id, context = ctx, err, "runner spawn failed");
            }
            EventKind::GraceExceeded => {
                tracing::error!(target: TARGET, grace_ms = e.timeout_ms, stuck = err, "shutdown grace exceeded");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: TARGET, subscriber = task, info = err, "subscriber panicked");
            }
            EventKind::NoTasksRegistered => {
                tracing::warn!(target: TARGET, "no tasks registered");
            }
            EventKind::LifecycleIgnored => {
                tracing::warn!(target: TARGET, reason = err, "host signal ignored");
            }
            EventKind::BusLagged => {
                tracing::warn!(target: TARGET, skipped = e.count, "event listener lagged; per-run events skipped");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: TARGET, subscriber = task, reason = err, "subscriber dropped event");
            }
            EventKind::WorkerStarted => {
                tracing::info!(target: TARGET, runners = e.count, "periodic worker started");
            }
            EventKind::StopRequested => {
                tracing::info!(target: TARGET, runners = e.count, "periodic worker stopping");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: TARGET, "all runners stopped within grace");
            }
            EventKind::RunnerSpawned => {
                tracing::debug!(target: TARGET, task, id = e.task_id, context = ctx, period_ms = e.period_ms, "runner spawned");
            }
            EventKind::RunnerCancelled => {
                tracing::debug!(target: TARGET, task, id = e.task_id, runs = e.run, "runner cancelled");
            }
            EventKind::TaskStarting => {
                tracing::trace!(target: TARGET, task, id = e.task_id, run = e.run, "run starting");
            }
            EventKind::TaskSucceeded => {
                tracing::trace!(target: TARGET, task, id = e.task_id, run = e.run, "run finished");
            }
            EventKind::RunScheduled => {
                tracing::trace!(target: TARGET, task, id = e.task_id, delay_ms = e.delay_ms, "next run scheduled");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
