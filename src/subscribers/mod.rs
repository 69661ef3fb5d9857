//! # Event subscribers: the logging collaborator of the worker.
//!
//! Runners and the worker never log directly. They publish [`Event`](crate::Event)s
//! on the bus; the worker fans them out to every [`Subscribe`] implementation through
//! a [`SubscriberSet`].
//!
//! ```text
//! Runner ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                    ├──► LogWriter (tracing)
//!                                                    └──► custom (metrics, alerts, tests)
//! ```
//!
//! [`LogWriter`] is installed by default; disable it with
//! [`PeriodicWorkerBuilder::without_log_writer`](crate::PeriodicWorkerBuilder::without_log_writer).

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
