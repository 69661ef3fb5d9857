//! # PeriodicWorker: registration, start fan-out, stop, joining shutdown.
//!
//! The worker is the only owner of the registry and of the running-task arena.
//! Runners never see each other; each only reads its own cancellation token.
//!
//! ## Lifecycle
//! ```text
//! register()* ──► start() ──────────────────────────► stop() / shutdown()
//!                  │ freeze registry                    │ cancel every token
//!                  │ empty? → NoTasksRegistered (warn)  │ Detach: return
//!                  └─► per task:                        └─ Join:   await runners ≤ grace,
//!                        ctx.spawn(Runner::run(child))              abort + report stragglers
//!                        ├─ Ok  → RunningTask{token, join, probe}
//!                        └─ Err → SpawnFailed, continue
//! ```
//!
//! ## Event flow
//! ```text
//! Runner ─┐
//! Runner ─┼─ publish ─► Bus ─► listener ─► SubscriberSet ─► LogWriter / custom
//! Worker ─┘
//! ```
//!
//! ## Rules
//! - Signals out of order (stop before start, double start, start after stop)
//!   return a [`LifecycleError`] and publish `LifecycleIgnored`; nothing panics.
//! - Dropping the worker cancels every runner (host teardown).
//! - No mutex is held across an `.await`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    context::ContextRef,
    core::{
        builder::PeriodicWorkerBuilder,
        config::{Config, ShutdownPolicy},
        probe::{RunnerState, TaskProbe, TaskStatus},
        registry::TaskRegistry,
        runner::Runner,
    },
    error::{LifecycleError, RegistrationError, RuntimeError, TaskError},
    events::{Bus, Event, EventKind},
    lifecycle::{HostEvent, Lifecycle},
    subscribers::{Subscribe, SubscriberSet},
    tasks::{ActionFn, PeriodicTask, TaskId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WorkerPhase {
    Idle,
    Running,
    Stopped,
}

/// One spawned runner, owned by the worker.
struct RunningTask {
    id: TaskId,
    name: Arc<str>,
    context: Arc<str>,
    period: Duration,
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
    probe: Arc<TaskProbe>,
}

struct Slots {
    phase: WorkerPhase,
    running: Vec<RunningTask>,
}

/// Lifecycle-bound periodic task runner.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tickvisor::{Config, PeriodicWorker, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let worker = PeriodicWorker::builder(Config::default()).build()?;
/// worker.every(Duration::from_secs(30), || async {
///     // clear caches...
///     Ok::<_, TaskError>(())
/// })?;
///
/// worker.start()?;
/// // ... host runs ...
/// worker.stop()?;
/// # Ok(())
/// # }
/// ```
pub struct PeriodicWorker {
    cfg: Config,
    bus: Bus,
    default_context: ContextRef,
    registry: Mutex<TaskRegistry>,
    slots: Mutex<Slots>,
    root: CancellationToken,
    installed: AtomicBool,
}

impl PeriodicWorker {
    /// Starts building a worker.
    pub fn builder(cfg: Config) -> PeriodicWorkerBuilder {
        PeriodicWorkerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        default_context: ContextRef,
        subscribers: Vec<Arc<dyn Subscribe>>,
        registry: TaskRegistry,
    ) -> Arc<Self> {
        let (bus, reports) = Bus::with_reports(cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(subscribers, bus.clone());
        let root = CancellationToken::new();
        Self::subscriber_listener(&bus, reports, subs, root.clone());

        Arc::new(Self {
            cfg,
            bus,
            default_context,
            registry: Mutex::new(registry),
            slots: Mutex::new(Slots {
                phase: WorkerPhase::Idle,
                running: Vec::new(),
            }),
            root,
            installed: AtomicBool::new(false),
        })
    }

    /// Forwards bus events to the subscriber set until the worker is dropped.
    ///
    /// Reports are drained first. Skipped chatter is announced as `BusLagged`.
    fn subscriber_listener(
        bus: &Bus,
        mut reports: mpsc::UnboundedReceiver<Event>,
        subs: SubscriberSet,
        root: CancellationToken,
    ) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    Some(ev) = reports.recv() => subs.emit(ev),
                    msg = rx.recv() => match msg {
                        Ok(ev) => subs.emit(ev),
                        Err(RecvError::Lagged(n)) => subs.emit(
                            Event::new(EventKind::BusLagged)
                                .with_count(usize::try_from(n).unwrap_or(usize::MAX)),
                        ),
                        Err(RecvError::Closed) => break,
                    },
                    _ = root.cancelled() => break,
                }
            }
            subs.shutdown().await;
        });
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a task. Rejected with [`RegistrationError::Frozen`] once started.
    pub fn register(&self, task: PeriodicTask) -> Result<TaskId, RegistrationError> {
        self.lock_registry().register(task)
    }

    /// Registers `f` to run every `period` on the default context, without an immediate run.
    pub fn every<F, Fut>(&self, period: Duration, f: F) -> Result<TaskId, RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.register(PeriodicTask::new(period, ActionFn::arc(f))?)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.lock_registry().len()
    }

    /// Returns `true` when no task is registered.
    pub fn is_empty(&self) -> bool {
        self.lock_registry().is_empty()
    }

    // ---------------------------
    // Host lifecycle
    // ---------------------------

    /// Subscribes the worker to `host`: `Started` → [`start`](Self::start),
    /// `Stopping` → [`stop`](Self::stop) or [`shutdown`](Self::shutdown) per [`ShutdownPolicy`].
    ///
    /// Hooks hold a weak reference; a dropped worker makes them no-ops.
    pub fn install(self: &Arc<Self>, host: &dyn Lifecycle) -> Result<(), LifecycleError> {
        if self.installed.swap(true, Ordering::SeqCst) {
            return Err(LifecycleError::AlreadyInstalled);
        }

        let weak = Arc::downgrade(self);
        host.subscribe(
            HostEvent::Started,
            Box::new(move || {
                async move {
                    if let Some(worker) = weak.upgrade() {
                        // Errors are already published as LifecycleIgnored / GraceExceeded.
                        let _ = worker.start();
                    }
                }
                .boxed()
            }),
        );

        let weak = Arc::downgrade(self);
        host.subscribe(
            HostEvent::Stopping,
            Box::new(move || {
                async move {
                    if let Some(worker) = weak.upgrade() {
                        worker.on_host_stopping().await;
                    }
                }
                .boxed()
            }),
        );
        Ok(())
    }

    /// Host-driven stop; errors are reported on the bus, not returned.
    async fn on_host_stopping(&self) {
        match self.cfg.shutdown {
            ShutdownPolicy::Detach => {
                let _ = self.stop();
            }
            ShutdownPolicy::Join { .. } => {
                let _ = self.shutdown().await;
            }
        }
    }

    /// Freezes the registry and spawns one runner per task.
    ///
    /// Returns the number of runners spawned. A task whose context refuses the
    /// runner is reported (`SpawnFailed`) and skipped.
    pub fn start(&self) -> Result<usize, LifecycleError> {
        let mut slots = self.lock_slots();
        match slots.phase {
            WorkerPhase::Idle => {}
            WorkerPhase::Running => return Err(self.ignored(LifecycleError::AlreadyStarted)),
            WorkerPhase::Stopped => return Err(self.ignored(LifecycleError::AlreadyStopped)),
        }

        let tasks = self.lock_registry().freeze();
        if tasks.is_empty() {
            self.bus.publish(Event::new(EventKind::NoTasksRegistered));
        }

        for (id, task) in tasks {
            if let Some(running) = self.spawn_runner(id, task) {
                slots.running.push(running);
            }
        }
        slots.phase = WorkerPhase::Running;

        let spawned = slots.running.len();
        self.bus
            .publish(Event::new(EventKind::WorkerStarted).with_count(spawned));
        Ok(spawned)
    }

    fn spawn_runner(&self, id: TaskId, task: PeriodicTask) -> Option<RunningTask> {
        let ctx = task
            .context()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_context));
        let name: Arc<str> = Arc::from(task.name());
        let context: Arc<str> = Arc::from(ctx.name());
        let period = task.period();

        let probe = TaskProbe::new();
        let token = self.root.child_token();
        let runner = Runner::new(id, task, context.clone(), self.bus.clone(), probe.clone());

        let event = |kind| {
            Event::new(kind)
                .with_task(Arc::clone(&name))
                .with_task_id(id.index())
                .with_context(Arc::clone(&context))
        };

        match ctx.spawn(runner.run(token.clone()).boxed()) {
            Ok(join) => {
                self.bus
                    .publish(event(EventKind::RunnerSpawned).with_period(period));
                Some(RunningTask {
                    id,
                    name: Arc::clone(&name),
                    context: Arc::clone(&context),
                    period,
                    token,
                    join: Some(join),
                    probe,
                })
            }
            Err(e) => {
                self.bus
                    .publish(event(EventKind::SpawnFailed).with_error(e.to_string()));
                None
            }
        }
    }

    /// Cancels every runner and returns without waiting.
    ///
    /// Waiting runners exit at once; a runner inside its action finishes that run
    /// in the background and then exits without running again.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        self.cancel_all().map_err(|e| self.ignored(e))
    }

    /// Cancels every runner, then waits for them up to [`Config::join_grace`].
    ///
    /// Runners still inside an action when the grace expires are aborted and
    /// returned as [`RuntimeError::GraceExceeded`]. Calling this after
    /// [`stop`](Self::stop) joins the already-cancelled runners.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        match self.cancel_all() {
            Ok(()) | Err(LifecycleError::AlreadyStopped) => {}
            Err(e) => return Err(self.ignored(e).into()),
        }
        self.join_all_with_grace(self.cfg.join_grace()).await
    }

    fn cancel_all(&self) -> Result<(), LifecycleError> {
        let mut slots = self.lock_slots();
        match slots.phase {
            WorkerPhase::Idle => Err(LifecycleError::NotStarted),
            WorkerPhase::Stopped => Err(LifecycleError::AlreadyStopped),
            WorkerPhase::Running => {
                slots.phase = WorkerPhase::Stopped;
                for running in &slots.running {
                    running.token.cancel();
                }
                self.bus.publish(
                    Event::new(EventKind::StopRequested).with_count(slots.running.len()),
                );
                Ok(())
            }
        }
    }

    async fn join_all_with_grace(&self, grace: Duration) -> Result<(), RuntimeError> {
        let joins: Vec<(Arc<str>, JoinHandle<()>, Arc<TaskProbe>)> = {
            let mut slots = self.lock_slots();
            slots
                .running
                .iter_mut()
                .filter_map(|r| {
                    r.join
                        .take()
                        .map(|j| (Arc::clone(&r.name), j, Arc::clone(&r.probe)))
                })
                .collect()
        };

        // Lets freshly cancelled runners observe their token before the clock starts.
        task::yield_now().await;

        let deadline = time::Instant::now() + grace;
        let mut stuck = Vec::new();
        for (name, mut join, probe) in joins {
            if time::timeout_at(deadline, &mut join).await.is_err() {
                join.abort();
                // Only a runner inside an action is stuck; an idle one just had no turn yet.
                if probe.state().is_running() {
                    stuck.push(name.to_string());
                } else {
                    probe.set_state(RunnerState::Cancelled);
                }
            }
        }

        if stuck.is_empty() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            Ok(())
        } else {
            self.bus.publish(
                Event::new(EventKind::GraceExceeded)
                    .with_timeout(grace)
                    .with_error(stuck.join(",")),
            );
            Err(RuntimeError::GraceExceeded { grace, stuck })
        }
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Returns `true` between a successful start and the stop signal.
    pub fn is_running(&self) -> bool {
        self.lock_slots().phase == WorkerPhase::Running
    }

    /// Snapshot of every spawned runner, in registration order. Empty before start.
    pub fn status(&self) -> Vec<TaskStatus> {
        self.lock_slots()
            .running
            .iter()
            .map(|r| TaskStatus {
                id: r.id,
                name: r.name.to_string(),
                context: r.context.to_string(),
                period: r.period,
                state: r.probe.state(),
                runs: r.probe.runs(),
                failures: r.probe.failures(),
            })
            .collect()
    }

    /// The context used by tasks registered without one.
    pub fn default_context(&self) -> &ContextRef {
        &self.default_context
    }

    /// Worker configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Reports an out-of-order signal and hands the error back.
    fn ignored(&self, err: LifecycleError) -> LifecycleError {
        self.bus
            .publish(Event::new(EventKind::LifecycleIgnored).with_error(err.as_label()));
        err
    }

    fn lock_registry(&self) -> MutexGuard<'_, TaskRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PeriodicWorker {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
