//! Runtime core: registration, runners and the worker controller.
//!
//! The public API of this module is [`PeriodicWorker`] (plus its builder, config and
//! status snapshots). Everything else is an implementation detail.
//!
//! Internal modules:
//! - [`registry`]: append-only task list, frozen at start;
//! - [`runner`]: one fixed-delay loop per task with failure isolation;
//! - [`worker`]: start fan-out, stop, joining shutdown and host hooks;
//! - [`probe`]: per-runner state and counters behind [`PeriodicWorker::status`].

mod builder;
mod config;
mod probe;
mod registry;
mod runner;
mod worker;

pub use builder::PeriodicWorkerBuilder;
pub use config::{Config, ShutdownPolicy};
pub use probe::{RunnerState, TaskStatus};
pub use worker::PeriodicWorker;
