//! # tickvisor
//!
//! **Tickvisor** runs async actions at a fixed period for as long as a host
//! application is alive.
//!
//! Tasks are registered before the host starts, spawned on the host's start
//! signal (each on its own execution context) and cancelled on the host's stop
//! signal. A failing or panicking action never affects its siblings, and never
//! stops its own schedule.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ PeriodicTask │   │ PeriodicTask │   │ PeriodicTask │
//!     │ (period, fn) │   │ (period, fn) │   │ (period, fn) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PeriodicWorker (lifecycle controller)                            │
//! │  - TaskRegistry (append-only, frozen at start)                    │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to LogWriter + user subscribers)       │
//! │  - root CancellationToken (one child per runner)                  │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        │ ctx.spawn        │ ctx.spawn        │ ctx.spawn     │
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │    Runner    │   │    Runner    │   │    Runner    │   │
//!     │ "io" context │   │ "io" context │   │ compute pool │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ TaskStarting     │ TaskFailed       │ RunScheduled    │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │        Bus (reports: unbounded lane / chatter: broadcast ring)    │
//! │                   (ring capacity: Config::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          (per-sub queues)
//! ```
//!
//! ### Runner loop
//! ```text
//! spawn(runner) on task.context (or the worker default)
//!
//! if runs_on_start && !cancelled ─► execute(on-start)
//! loop {
//!   ├─► cancelled? ─► exit
//!   ├─► publish RunScheduled{ delay = period }
//!   ├─► select { cancelled ─► exit, sleep(period) }
//!   └─► execute(periodic)
//!           ├─ Ok         ─► TaskSucceeded
//!           ├─ Err        ─► TaskFailed, keep going
//!           └─ panic      ─► TaskFailed, keep going
//! }
//! publish RunnerCancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                                |
//! |-------------------|----------------------------------------------------------|---------------------------------------------------|
//! | **Tasks**         | Periodic definitions and their actions.                  | [`PeriodicTask`], [`Action`], [`ActionFn`]        |
//! | **Worker**        | Registry, start/stop, joining shutdown, status.          | [`PeriodicWorker`], [`Config`], [`ShutdownPolicy`]|
//! | **Contexts**      | Where runners execute.                                   | [`ExecutionContext`], [`TokioContext`], [`ComputeContext`] |
//! | **Host**          | Start/stop notifications from the embedding application. | [`Lifecycle`], [`HostMonitor`]                    |
//! | **Subscriber API**| Hook into run events (logging, metrics).                 | [`Subscribe`], [`LogWriter`]                      |
//! | **Errors**        | Typed errors for registration, runs and lifecycle.       | [`RegistrationError`], [`TaskError`], [`LifecycleError`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{Config, HostEvent, HostMonitor, PeriodicTask, PeriodicWorker, TaskError, ActionFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker = PeriodicWorker::builder(Config::default()).build()?;
//!
//!     worker.every(Duration::from_millis(50), || async {
//!         println!("tick");
//!         Ok::<_, TaskError>(())
//!     })?;
//!
//!     let warmup = PeriodicTask::builder(Duration::from_secs(60))
//!         .named("warmup")
//!         .runs_on_start(true)
//!         .build(ActionFn::arc(|| async { Ok::<_, TaskError>(()) }))?;
//!     worker.register(warmup)?;
//!
//!     let host = HostMonitor::new();
//!     worker.install(&host)?;
//!
//!     host.raise(HostEvent::Started).await;
//!     tokio::time::sleep(Duration::from_millis(120)).await;
//!     host.raise(HostEvent::Stopping).await;
//!     Ok(())
//! }
//! ```
mod context;
mod core;
mod error;
mod events;
mod lifecycle;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use context::{ComputeContext, ContextRef, ExecutionContext, TokioContext};
pub use core::{Config, PeriodicWorker, PeriodicWorkerBuilder, RunnerState, ShutdownPolicy, TaskStatus};
pub use error::{ContextError, LifecycleError, RegistrationError, RuntimeError, TaskError};
pub use events::{Event, EventKind, Phase};
pub use lifecycle::{HostEvent, HostMonitor, Hook, Lifecycle, wait_for_shutdown_signal};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Action, ActionFn, ActionRef, PeriodicTask, PeriodicTaskBuilder, TaskId};
