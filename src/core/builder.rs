use std::sync::Arc;

use tokio::runtime::Handle;

use crate::{
    context::{ContextRef, TokioContext},
    core::{config::Config, registry::TaskRegistry, worker::PeriodicWorker},
    error::ContextError,
    subscribers::{LogWriter, Subscribe},
    tasks::PeriodicTask,
};

/// Builder for constructing a [`PeriodicWorker`].
pub struct PeriodicWorkerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    log_writer: bool,
    default_context: Option<ContextRef>,
    tasks: Vec<PeriodicTask>,
}

impl PeriodicWorkerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            log_writer: true,
            default_context: None,
            tasks: Vec::new(),
        }
    }

    /// Adds event subscribers (metrics, alerting, custom logging).
    ///
    /// Subscribers receive events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Skips the built-in [`LogWriter`].
    pub fn without_log_writer(mut self) -> Self {
        self.log_writer = false;
        self
    }

    /// Sets the context used by tasks registered without one.
    ///
    /// Defaults to [`TokioContext::current`] captured in [`build`](Self::build).
    pub fn with_default_context(mut self, context: ContextRef) -> Self {
        self.default_context = Some(context);
        self
    }

    /// Registers a task up front (same rules as [`PeriodicWorker::register`]).
    pub fn with_task(mut self, task: PeriodicTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Builds the worker.
    ///
    /// Must be called within a tokio runtime: subscriber workers and the event
    /// listener are spawned here. Runners are only spawned on start.
    pub fn build(self) -> Result<Arc<PeriodicWorker>, ContextError> {
        Handle::try_current().map_err(|_| ContextError::NoRuntime)?;

        let default_context: ContextRef = match self.default_context {
            Some(ctx) => ctx,
            None => Arc::new(TokioContext::current()?),
        };

        let mut subscribers = self.subscribers;
        if self.log_writer {
            subscribers.insert(0, Arc::new(LogWriter::new()));
        }

        let registry = TaskRegistry::from_tasks(self.tasks);
        let worker = PeriodicWorker::new_internal(self.cfg, default_context, subscribers, registry);
        Ok(worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::ActionFn;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn test_build_outside_runtime_fails() {
        match PeriodicWorkerBuilder::new(Config::default()).build() {
            Err(err) => assert_eq!(err.as_label(), "context_no_runtime"),
            Ok(_) => panic!("built a worker without a runtime"),
        }
    }

    #[tokio::test]
    async fn test_default_context_is_io_unless_overridden() {
        let worker = PeriodicWorkerBuilder::new(Config::default()).build().unwrap();
        assert_eq!(worker.default_context().name(), TokioContext::DEFAULT_NAME);

        let worker = PeriodicWorkerBuilder::new(Config::default())
            .without_log_writer()
            .with_default_context(TokioContext::arc("jobs", Handle::current()))
            .build()
            .unwrap();
        assert_eq!(worker.default_context().name(), "jobs");
    }

    #[tokio::test(start_paused = true)]
    async fn test_prebuilt_tasks_are_registered_in_order() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let task = PeriodicTask::builder(Duration::from_secs(1))
            .named("first")
            .build(ActionFn::arc(move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(())
                }
            }))
            .unwrap();

        let worker = PeriodicWorkerBuilder::new(Config::default())
            .with_task(task)
            .build()
            .unwrap();
        let second = worker
            .every(Duration::from_secs(1), || async { Ok::<_, TaskError>(()) })
            .unwrap();
        assert_eq!(second.index(), 1);

        worker.start().unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(worker.status()[0].name, "first");
    }
}
