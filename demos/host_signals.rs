//! # Demo: host_signals
//!
//! Binds a worker to an in-process host whose lifetime ends on Ctrl-C / SIGTERM.
//!
//! ## Flow
//! ```text
//! HostMonitor::run_until_signal()
//!     ├─► raise(Started)  ──► PeriodicWorker::start()
//!     ├─► wait for SIGINT / SIGTERM
//!     └─► raise(Stopping) ──► PeriodicWorker::shutdown() (Join policy)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example host_signals   # then press Ctrl-C
//! ```

use std::time::Duration;

use tickvisor::{Config, HostMonitor, PeriodicWorker, ShutdownPolicy, TaskError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickvisor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config {
        shutdown: ShutdownPolicy::Join {
            grace: Duration::from_secs(3),
        },
        ..Config::default()
    };
    let worker = PeriodicWorker::builder(cfg).build()?;

    worker.every(Duration::from_secs(1), || async {
        tracing::info!("flushing buffers");
        tokio::time::sleep(Duration::from_millis(400)).await;
        Ok::<_, TaskError>(())
    })?;

    let host = HostMonitor::new();
    worker.install(&host)?;

    host.run_until_signal().await?;
    tracing::info!("host stopped");
    Ok(())
}
