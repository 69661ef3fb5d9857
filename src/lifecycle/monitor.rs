//! # HostMonitor: in-process host lifecycle.
//!
//! Keeps the hooks subscribed per [`HostEvent`] and fires them when the event is
//! raised. Each event fires once: raising it drains its hooks, and hooks
//! subscribed after that are dropped.
//!
//! ```text
//! raise(Started)  ──► hook₁().await ──► hook₂().await ...
//! raise(Stopping) ──► hook₁().await ──► ...
//! raise(Started)  ──► (already fired: nothing)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::lifecycle::{Hook, HostEvent, Lifecycle, signals::wait_for_shutdown_signal};

#[derive(Default)]
struct Hooks {
    pending: HashMap<HostEvent, Vec<Hook>>,
    fired: HashSet<HostEvent>,
}

/// In-process [`Lifecycle`] implementation.
///
/// ## Example
/// ```rust
/// use futures::FutureExt;
/// use tickvisor::{HostEvent, HostMonitor, Lifecycle};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let host = HostMonitor::new();
/// host.subscribe(HostEvent::Started, Box::new(|| async { println!("up") }.boxed()));
/// assert_eq!(host.raise(HostEvent::Started).await, 1);
/// assert_eq!(host.raise(HostEvent::Started).await, 0);
/// # }
/// ```
#[derive(Default)]
pub struct HostMonitor {
    hooks: Mutex<Hooks>,
}

impl HostMonitor {
    /// Creates a monitor with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every hook subscribed to `event`, in subscription order, awaiting each.
    ///
    /// Returns the number of hooks fired (0 when the event was already raised).
    pub async fn raise(&self, event: HostEvent) -> usize {
        let hooks = {
            let mut state = self.lock();
            if !state.fired.insert(event) {
                return 0;
            }
            state.pending.remove(&event).unwrap_or_default()
        };

        let fired = hooks.len();
        for hook in hooks {
            hook().await;
        }
        fired
    }

    /// Returns `true` once `event` has been raised.
    pub fn has_fired(&self, event: HostEvent) -> bool {
        self.lock().fired.contains(&event)
    }

    /// Raises `Started`, waits for an OS termination signal, then raises `Stopping`.
    pub async fn run_until_signal(&self) -> std::io::Result<()> {
        self.raise(HostEvent::Started).await;
        let res = wait_for_shutdown_signal().await;
        self.raise(HostEvent::Stopping).await;
        res
    }

    fn lock(&self) -> MutexGuard<'_, Hooks> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Lifecycle for HostMonitor {
    fn subscribe(&self, event: HostEvent, hook: Hook) {
        let mut state = self.lock();
        if state.fired.contains(&event) {
            return;
        }
        state.pending.entry(event).or_default().push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_hook(counter: &Arc<AtomicUsize>) -> Hook {
        let c = counter.clone();
        Box::new(move || {
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_hooks_fire_once_per_event() {
        let host = HostMonitor::new();
        let started = Arc::new(AtomicUsize::new(0));
        let stopping = Arc::new(AtomicUsize::new(0));

        host.subscribe(HostEvent::Started, counting_hook(&started));
        host.subscribe(HostEvent::Started, counting_hook(&started));
        host.subscribe(HostEvent::Stopping, counting_hook(&stopping));

        assert_eq!(host.raise(HostEvent::Started).await, 2);
        assert_eq!(host.raise(HostEvent::Started).await, 0);
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(stopping.load(Ordering::SeqCst), 0);
        assert!(host.has_fired(HostEvent::Started));
        assert!(!host.has_fired(HostEvent::Stopping));

        assert_eq!(host.raise(HostEvent::Stopping).await, 1);
        assert_eq!(stopping.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_late_subscription_is_dropped() {
        let host = HostMonitor::new();
        let counter = Arc::new(AtomicUsize::new(0));
        host.raise(HostEvent::Stopping).await;

        host.subscribe(HostEvent::Stopping, counting_hook(&counter));
        assert_eq!(host.raise(HostEvent::Stopping).await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
