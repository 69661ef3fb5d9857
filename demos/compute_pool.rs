//! # Demo: compute_pool
//!
//! Runs a CPU-bound task on a dedicated pool next to I/O tasks on the host runtime.
//!
//! A blocking action on its own [`ComputeContext`] cannot starve the default
//! context: the heartbeat keeps its cadence while the checksum task grinds.
//!
//! ## Run
//! ```bash
//! cargo run --example compute_pool
//! ```

use std::time::{Duration, Instant};

use tickvisor::{ActionFn, ComputeContext, Config, PeriodicTask, PeriodicWorker, TaskError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn checksum(rounds: u64) -> u64 {
    (0..rounds).fold(0u64, |acc, x| acc.wrapping_mul(31).wrapping_add(x))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickvisor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let worker = PeriodicWorker::builder(Config::default()).build()?;

    let grind = PeriodicTask::builder(Duration::from_millis(200))
        .named("checksum")
        .on(ComputeContext::arc("compute", 2)?)
        .build(ActionFn::arc(|| async {
            let started = Instant::now();
            let sum = checksum(50_000_000);
            tracing::info!(
                thread = std::thread::current().name().unwrap_or("?"),
                took = ?started.elapsed(),
                sum,
                "checksum done"
            );
            Ok::<_, TaskError>(())
        }))?;
    worker.register(grind)?;

    worker.every(Duration::from_millis(100), || async {
        tracing::info!("heartbeat");
        Ok::<_, TaskError>(())
    })?;

    worker.start()?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    worker.stop()?;
    Ok(())
}
