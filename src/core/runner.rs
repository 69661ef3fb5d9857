//! # Runner: the per-task control loop.
//!
//! One runner drives one [`PeriodicTask`] from spawn to cancellation:
//!
//! ```text
//! Init ──(runs_on_start)──► RunningImmediate ─┐
//!   │                                         ▼
//!   └───────────────────────────────────► Waiting ──(period elapsed)──► Running
//!                                           ▲  │                          │
//!                                           │  └──(token cancelled)──► Cancelled
//!                                           └─────────────────────────────┘
//! ```
//!
//! ## Rules
//! - **Fixed delay**: the wait is armed after the previous run completed, so a run
//!   taking `d` spaces run starts by `period + d`.
//! - **Cooperative cancellation**: checked on entry to `Waiting` and raced against the
//!   sleep (cancellation wins ties). An action in flight is never interrupted.
//! - **Failure isolation**: errors and panics of the action are caught by [`run_once`],
//!   reported on the bus and followed by the next wait. Nothing escapes the runner.
//! - Runs of one task never overlap.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::probe::{RunnerState, TaskProbe};
use crate::error::{TaskError, panic_message};
use crate::events::{Bus, Event, EventKind, Phase};
use crate::tasks::{Action, PeriodicTask, TaskId};

/// Drives one task until its token is cancelled.
pub(crate) struct Runner {
    id: TaskId,
    task: PeriodicTask,
    name: Arc<str>,
    context: Arc<str>,
    bus: Bus,
    probe: Arc<TaskProbe>,
}

impl Runner {
    pub(crate) fn new(
        id: TaskId,
        task: PeriodicTask,
        context: Arc<str>,
        bus: Bus,
        probe: Arc<TaskProbe>,
    ) -> Self {
        let name = Arc::from(task.name());
        Self {
            id,
            task,
            name,
            context,
            bus,
            probe,
        }
    }

    /// Runs the loop; returns once `token` is observed cancelled.
    pub(crate) async fn run(self, token: CancellationToken) {
        if self.task.runs_on_start() && !token.is_cancelled() {
            self.execute(Phase::Immediate).await;
        }

        loop {
            self.probe.set_state(RunnerState::Waiting);
            if token.is_cancelled() {
                break;
            }

            let period = self.task.period();
            self.bus.publish(
                self.event(EventKind::RunScheduled)
                    .with_delay(period)
                    .with_run(self.probe.runs()),
            );

            let sleep = time::sleep(period);
            tokio::pin!(sleep);
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = &mut sleep => {}
            }

            self.execute(Phase::Periodic).await;
        }

        self.probe.set_state(RunnerState::Cancelled);
        self.bus
            .publish(self.event(EventKind::RunnerCancelled).with_run(self.probe.runs()));
    }

    /// One execution with isolation and reporting.
    async fn execute(&self, phase: Phase) {
        self.probe.set_state(match phase {
            Phase::Immediate => RunnerState::RunningImmediate,
            Phase::Periodic => RunnerState::Running,
        });
        let run = self.probe.runs() + 1;
        self.bus.publish(
            self.event(EventKind::TaskStarting)
                .with_phase(phase)
                .with_run(run),
        );

        let res = run_once(self.task.action().as_ref()).await;
        self.probe.record_run(res.is_err());

        let ev = match res {
            Ok(()) => self.event(EventKind::TaskSucceeded),
            Err(e) => self.event(EventKind::TaskFailed).with_error(e.to_string()),
        };
        self.bus.publish(ev.with_phase(phase).with_run(run));
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_task(Arc::clone(&self.name))
            .with_task_id(self.id.index())
            .with_context(Arc::clone(&self.context))
    }
}

/// Executes `action` once; a panic becomes [`TaskError::Panicked`].
pub(crate) async fn run_once(action: &dyn Action) -> Result<(), TaskError> {
    match AssertUnwindSafe(action.run()).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Panicked {
            info: panic_message(&*payload),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{ActionFn, ActionRef};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn spawn_runner(
        task: PeriodicTask,
        token: &CancellationToken,
    ) -> (Arc<TaskProbe>, tokio::task::JoinHandle<()>) {
        let probe = TaskProbe::new();
        let runner = Runner::new(TaskId(0), task, Arc::from("io"), Bus::new(64), probe.clone());
        let join = tokio::spawn(runner.run(token.clone()));
        (probe, join)
    }

    fn every(period: Duration, action: ActionRef) -> PeriodicTask {
        PeriodicTask::new(period, action).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_spacing_includes_run_time() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let s = starts.clone();
        let action = ActionFn::arc(move || {
            let s = s.clone();
            async move {
                s.lock().unwrap().push(Instant::now());
                time::sleep(Duration::from_millis(500)).await;
                Ok::<_, TaskError>(())
            }
        });

        let origin = Instant::now();
        let token = CancellationToken::new();
        let (probe, _join) = spawn_runner(every(Duration::from_secs(1), action), &token);

        time::sleep(Duration::from_millis(4600)).await;
        assert_eq!(probe.runs(), 3);

        let offsets: Vec<_> = starts
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(origin))
            .collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2500),
                Duration::from_millis(4000),
            ]
        );
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_exits_without_running() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let action = ActionFn::arc(move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let token = CancellationToken::new();
        let (probe, join) = spawn_runner(every(Duration::from_secs(10), action), &token);

        time::sleep(Duration::from_secs(1)).await;
        let cancelled_at = Instant::now();
        token.cancel();
        join.await.unwrap();

        assert_eq!(Instant::now(), cancelled_at);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.state(), RunnerState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_action_finishes_then_runner_exits() {
        let finished = Arc::new(AtomicBool::new(false));
        let f = finished.clone();
        let action = ActionFn::arc(move || {
            let f = f.clone();
            async move {
                time::sleep(Duration::from_secs(5)).await;
                f.store(true, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let origin = Instant::now();
        let token = CancellationToken::new();
        let (probe, join) = spawn_runner(every(Duration::from_secs(1), action), &token);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(probe.state(), RunnerState::Running);
        token.cancel();
        join.await.unwrap();

        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(probe.runs(), 1);
        assert_eq!(Instant::now().duration_since(origin), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_action_keeps_ticking() {
        let action: ActionRef = ActionFn::arc(|| async {
            if true {
                panic!("tick exploded");
            }
            Ok::<_, TaskError>(())
        });

        let token = CancellationToken::new();
        let (probe, join) = spawn_runner(every(Duration::from_secs(1), action), &token);

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(probe.runs(), 3);
        assert_eq!(probe.failures(), 3);
        assert_eq!(probe.state(), RunnerState::Waiting);

        token.cancel();
        join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_skips_immediate_run() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let task = PeriodicTask::builder(Duration::from_secs(1))
            .runs_on_start(true)
            .build(ActionFn::arc(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(())
                }
            }))
            .unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let (probe, join) = spawn_runner(task, &token);
        join.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.state(), RunnerState::Cancelled);
    }

    #[tokio::test]
    async fn test_run_once_converts_error_and_panic() {
        let ok: ActionRef = ActionFn::arc(|| async { Ok::<_, TaskError>(()) });
        let failing: ActionRef = ActionFn::arc(|| async { Err::<(), _>(TaskError::fail("nope")) });
        let panicking: ActionRef = ActionFn::arc(|| async {
            if true {
                panic!("{}", String::from("owned message"));
            }
            Ok::<_, TaskError>(())
        });

        assert_eq!(run_once(ok.as_ref()).await, Ok(()));
        assert_eq!(run_once(failing.as_ref()).await, Err(TaskError::fail("nope")));
        assert_eq!(
            run_once(panicking.as_ref()).await,
            Err(TaskError::Panicked {
                info: "owned message".into()
            })
        );
    }
}
