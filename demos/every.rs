//! # Demo: every
//!
//! Registers a few periodic tasks and drives the worker by hand.
//!
//! Shows how to:
//! - Register closures with [`PeriodicWorker::every`].
//! - Use [`PeriodicTask::builder`] for a named task with an on-start run.
//! - Watch a failing task keep its schedule.
//! - Read [`PeriodicWorker::status`] snapshots.
//!
//! ## Run
//! ```bash
//! RUST_LOG=tickvisor=debug cargo run --example every
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tickvisor::{ActionFn, Config, PeriodicTask, PeriodicWorker, TaskError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickvisor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let worker = PeriodicWorker::builder(Config::default()).build()?;

    worker.every(Duration::from_millis(300), || async {
        tracing::info!("heartbeat");
        Ok::<_, TaskError>(())
    })?;

    let attempts = Arc::new(AtomicU32::new(0));
    let a = attempts.clone();
    let flaky = PeriodicTask::builder(Duration::from_millis(500))
        .named("flaky-sync")
        .runs_on_start(true)
        .build(ActionFn::arc(move || {
            let a = a.clone();
            async move {
                let n = a.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    return Err(TaskError::fail(format!("upstream unavailable (attempt {n})")));
                }
                Ok(())
            }
        }))?;
    worker.register(flaky)?;

    worker.start()?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    for st in worker.status() {
        println!(
            "{} {:<12} ctx={} period={:?} state={:?} runs={} failures={}",
            st.id, st.name, st.context, st.period, st.state, st.runs, st.failures
        );
    }

    worker.shutdown().await?;
    Ok(())
}
