//! # Dedicated compute pool.
//!
//! [`ComputeContext`] owns its own multi-thread tokio runtime, so CPU-heavy actions
//! never compete with the host's I/O workers. Worker threads are named
//! `"{name}-worker"`.
//!
//! Dropping the context shuts its runtime down in the background (safe from async
//! code); runners still on it are dropped at their next suspension point.

use std::borrow::Cow;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::context::{ContextRef, ExecutionContext};
use crate::error::ContextError;

/// Context owning a dedicated multi-thread runtime.
pub struct ComputeContext {
    name: Cow<'static, str>,
    runtime: Option<Runtime>,
}

impl ComputeContext {
    /// Builds a pool with `threads` workers (minimum 1).
    pub fn new(name: impl Into<Cow<'static, str>>, threads: usize) -> Result<Self, ContextError> {
        let name = name.into();
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads.max(1))
            .thread_name(format!("{name}-worker"))
            .enable_time()
            .build()
            .map_err(|source| ContextError::Build {
                name: name.to_string(),
                source,
            })?;
        Ok(Self {
            name,
            runtime: Some(runtime),
        })
    }

    /// Builds the pool and returns it as a [`ContextRef`].
    pub fn arc(name: impl Into<Cow<'static, str>>, threads: usize) -> Result<ContextRef, ContextError> {
        Ok(Arc::new(Self::new(name, threads)?))
    }
}

impl ExecutionContext for ComputeContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<JoinHandle<()>, ContextError> {
        match &self.runtime {
            Some(rt) => Ok(rt.spawn(fut)),
            None => Err(ContextError::Closed {
                name: self.name.to_string(),
            }),
        }
    }
}

impl Drop for ComputeContext {
    fn drop(&mut self) {
        if let Some(rt) = self.runtime.take() {
            rt.shutdown_background();
        }
    }
}
