//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] carries events from many publishers (runners, worker, subscriber workers)
//! to the worker's listener over two lanes:
//!
//! ```text
//! Publishers (many):                        Listener (one):
//!   Runner 1 ──┐      ┌─► reports (unbounded mpsc) ──┐
//!   Runner 2 ──┼──────┤                              ├──► SubscriberSet
//!   Worker   ──┘      └─► chatter (broadcast ring) ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Reports are lossless**: kinds with [`EventKind::is_report`] go to the
//!   unbounded lane once one is attached ([`Bus::with_reports`]).
//! - **Chatter is bounded**: everything else shares a ring buffer; slow receivers get
//!   `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No cross-lane ordering**: use `Event::seq` to order events from both lanes.
//! - **No persistence**: chatter is lost if there are no active receivers at send time.

use tokio::sync::{broadcast, mpsc};

use super::event::{Event, EventKind};

/// Two-lane channel for runtime events.
///
/// Cheap to clone (internally holds `Arc`-backed senders).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    reports: Option<mpsc::UnboundedSender<Event>>,
}

impl Bus {
    /// Creates a broadcast-only bus with the given ring capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx, reports: None }
    }

    /// Creates a bus whose reports bypass the ring, plus the receiver of that lane.
    pub fn with_reports(capacity: usize) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        let mut bus = Self::new(capacity);
        bus.reports = Some(reports_tx);
        (bus, reports_rx)
    }

    /// Publishes an event.
    ///
    /// Reports go to the unbounded lane while its receiver is alive; everything else
    /// (and reports without a live lane) goes to the ring buffer.
    pub fn publish(&self, ev: Event) {
        let ev = match (&self.reports, ev.kind.is_report()) {
            (Some(reports), true) => match reports.send(ev) {
                Ok(()) => return,
                Err(mpsc::error::SendError(ev)) => ev,
            },
            _ => ev,
        };
        let _ = self.tx.send(ev);
    }

    /// Creates a new ring receiver that will observe subsequent chatter.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::StopRequested));
    }

    #[tokio::test]
    async fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::WorkerStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::StopRequested).with_task("cleanup"));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::StopRequested);
        assert_eq!(ev.task.as_deref(), Some("cleanup"));
    }

    #[tokio::test]
    async fn test_reports_survive_ring_overflow() {
        let (bus, mut reports) = Bus::with_reports(2);
        let mut rx = bus.subscribe();

        for run in 0..10 {
            bus.publish(Event::new(EventKind::TaskStarting).with_run(run));
            bus.publish(Event::new(EventKind::TaskFailed).with_run(run));
        }

        for run in 0..10 {
            let ev = reports.recv().await.expect("report");
            assert_eq!(ev.kind, EventKind::TaskFailed);
            assert_eq!(ev.run, Some(run));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(8))
        ));
    }

    #[tokio::test]
    async fn test_reports_fall_back_to_ring_when_lane_is_gone() {
        let (bus, reports) = Bus::with_reports(8);
        drop(reports);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::SpawnFailed));
        assert_eq!(rx.recv().await.expect("event").kind, EventKind::SpawnFailed);
    }
}
