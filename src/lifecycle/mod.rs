//! # Host lifecycle abstraction.
//!
//! The worker does not depend on any application framework. It only needs a
//! place to subscribe two one-shot notifications:
//!
//! - [`HostEvent::Started`] - the host finished starting; runners should spawn.
//! - [`HostEvent::Stopping`] - the host is shutting down; runners should stop.
//!
//! Any host implements [`Lifecycle`]; [`HostMonitor`] is a ready-made in-process
//! implementation (also usable as an OS-signal driven main loop).

mod monitor;
mod signals;

pub use monitor::HostMonitor;
pub use signals::wait_for_shutdown_signal;

use futures::future::BoxFuture;

/// Host notifications the worker subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Host startup completed.
    Started,
    /// Host shutdown began.
    Stopping,
}

/// One-shot callback fired by the host; the returned future is awaited by the host.
pub type Hook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>;

/// # Subscription point offered by a host application.
///
/// Each hook fires at most once.
pub trait Lifecycle: Send + Sync {
    /// Registers `hook` to run when `event` is raised.
    fn subscribe(&self, event: HostEvent, hook: Hook);
}
