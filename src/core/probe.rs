//! # Per-task status probes.
//!
//! Each runner owns one [`TaskProbe`] and is its only writer; the worker reads it
//! to build [`TaskStatus`] snapshots. Lock-free: plain atomics, `Relaxed` ordering
//! (snapshots are advisory, not synchronization points).

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use crate::tasks::TaskId;

/// Runner state machine position.
///
/// ```text
/// Init → (RunningImmediate) → Waiting ⇄ Running → Cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunnerState {
    /// Spawned, not yet polled.
    Init = 0,
    /// Executing the on-start run.
    RunningImmediate = 1,
    /// Sleeping until the next tick.
    Waiting = 2,
    /// Executing a periodic run.
    Running = 3,
    /// Terminal.
    Cancelled = 4,
}

impl RunnerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => RunnerState::Init,
            1 => RunnerState::RunningImmediate,
            2 => RunnerState::Waiting,
            3 => RunnerState::Running,
            _ => RunnerState::Cancelled,
        }
    }

    /// Returns `true` while an action is executing.
    pub fn is_running(self) -> bool {
        matches!(self, RunnerState::RunningImmediate | RunnerState::Running)
    }
}

/// Snapshot of one registered task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskStatus {
    /// Registration position.
    pub id: TaskId,
    /// Task label.
    pub name: String,
    /// Execution context name.
    pub context: String,
    /// Configured period.
    pub period: Duration,
    /// Current runner state.
    pub state: RunnerState,
    /// Completed executions (successful or not), immediate run included.
    pub runs: u64,
    /// Failed executions.
    pub failures: u64,
}

/// Shared, runner-written state of one task.
#[derive(Debug)]
pub(crate) struct TaskProbe {
    state: AtomicU8,
    runs: AtomicU64,
    failures: AtomicU64,
}

impl TaskProbe {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(RunnerState::Init as u8),
            runs: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    pub(crate) fn set_state(&self, state: RunnerState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    pub(crate) fn state(&self) -> RunnerState {
        RunnerState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Records a finished run and returns the new run count.
    pub(crate) fn record_run(&self, failed: bool) -> u64 {
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.runs.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
