//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the worker and its runners.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] lossless report lane plus a `tokio::sync::broadcast` ring for per-run chatter
//! - [`Phase`] which kind of execution produced a run event
//!
//! ## Quick reference
//! - **Publishers**: `PeriodicWorker` (start/stop/spawn), runners (runs, failures,
//!   cancellation), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the worker's listener, which fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Phase};
