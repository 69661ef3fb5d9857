//! # Worker configuration.
//!
//! [`Config`] centralizes the few runtime knobs of a [`PeriodicWorker`](crate::PeriodicWorker).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `ShutdownPolicy::Join { grace: 0s }` → nothing is awaited: idle runners are
//!   cancelled quietly, runners inside an action are aborted at once and reported as stuck

use std::time::Duration;

/// What a stop signal does with actions that are still executing.
///
/// Cancellation itself is always cooperative: a runner that is waiting exits at
/// once and never starts another run. The policy only decides whether the host's
/// stop path waits for runners that are **inside** an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Cancel every runner and return immediately. In-flight actions finish in
    /// the background; their runners exit afterwards without running again.
    #[default]
    Detach,
    /// Cancel every runner, then wait up to `grace` for in-flight actions.
    /// Runners still busy after `grace` are aborted and reported as stuck.
    Join {
        /// Maximum time to wait.
        grace: Duration,
    },
}

/// Global configuration for the worker runtime.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `shutdown`: stop behavior used by installed host hooks
/// - `shutdown_grace`: grace used by [`PeriodicWorker::shutdown`](crate::PeriodicWorker::shutdown)
///   when the policy is `Detach`
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Applies to per-run events only; when the listener falls more than `bus_capacity`
    /// events behind, the oldest are skipped and a `BusLagged` event is emitted.
    /// Failures and other reports bypass the ring and are never skipped.
    pub bus_capacity: usize,

    /// Stop behavior applied when the host raises `Stopping`.
    pub shutdown: ShutdownPolicy,

    /// Grace for an explicit joining shutdown when `shutdown` is `Detach`.
    pub shutdown_grace: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Grace used when joining runners.
    #[inline]
    pub fn join_grace(&self) -> Duration {
        match self.shutdown {
            ShutdownPolicy::Join { grace } => grace,
            ShutdownPolicy::Detach => self.shutdown_grace,
        }
    }
}

impl Default for Config {
    /// - `bus_capacity = 1024`
    /// - `shutdown = ShutdownPolicy::Detach` (matches the usual host plugin behavior)
    /// - `shutdown_grace = 30s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            shutdown: ShutdownPolicy::Detach,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_grace_follows_policy() {
        let mut cfg = Config::default();
        assert_eq!(cfg.join_grace(), Duration::from_secs(30));

        cfg.shutdown = ShutdownPolicy::Join {
            grace: Duration::from_secs(2),
        };
        assert_eq!(cfg.join_grace(), Duration::from_secs(2));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
