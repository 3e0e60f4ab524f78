use std::{
  fmt::{Debug, Formatter},
  io,
  sync::Arc,
  thread,
};

use futures::{executor::ThreadPool, future};
use parking_lot::RwLock;

use super::{run_task, ScheduleError, Scheduler, Task};

/// A fixed pool of worker threads backed by [`futures::executor::ThreadPool`].
///
/// The handle is cheap to clone; clones share the pool, and `shutdown` from
/// any of them shuts it down for all.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  inner: Arc<PoolInner>,
}

struct PoolInner {
  name: String,
  pool: RwLock<Option<ThreadPool>>,
}

impl ThreadPoolScheduler {
  /// One worker per available core, threads named `computation-thread-N`.
  pub fn computation() -> io::Result<Self> {
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    Self::builder()
      .pool_size(workers)
      .name_prefix("computation-thread-")
      .create()
  }

  /// A single worker running tasks one after another in submission order.
  pub fn single_thread() -> io::Result<Self> {
    Self::builder().pool_size(1).name_prefix("single-thread-").create()
  }

  pub fn builder() -> ThreadPoolSchedulerBuilder { ThreadPoolSchedulerBuilder::default() }

  pub fn is_shutdown(&self) -> bool { self.inner.pool.read().is_none() }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    match &*self.inner.pool.read() {
      Some(pool) => {
        pool.spawn_ok(future::lazy(move |_| run_task(task)));
        Ok(())
      }
      None => {
        tracing::warn!(scheduler = %self.inner.name, "task rejected, scheduler is shut down");
        Err(ScheduleError::Shutdown)
      }
    }
  }

  fn shutdown(&self) {
    // Workers exit after the tasks already queued, once the pool is dropped.
    if self.inner.pool.write().take().is_some() {
      tracing::debug!(scheduler = %self.inner.name, "scheduler shut down");
    }
  }
}

impl Debug for ThreadPoolScheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ThreadPoolScheduler")
      .field("name", &self.inner.name)
      .field("is_shutdown", &self.is_shutdown())
      .finish()
  }
}

/// Configures a [`ThreadPoolScheduler`], in the style of
/// [`futures::executor::ThreadPoolBuilder`].
#[derive(Debug, Clone)]
pub struct ThreadPoolSchedulerBuilder {
  pool_size: usize,
  name_prefix: String,
}

impl Default for ThreadPoolSchedulerBuilder {
  fn default() -> Self {
    ThreadPoolSchedulerBuilder { pool_size: 1, name_prefix: "pool-thread-".to_owned() }
  }
}

impl ThreadPoolSchedulerBuilder {
  /// Number of worker threads. Clamped to at least one.
  pub fn pool_size(mut self, size: usize) -> Self {
    self.pool_size = size.max(1);
    self
  }

  /// Worker threads are named `{prefix}{index}`.
  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = prefix.into();
    self
  }

  pub fn create(self) -> io::Result<ThreadPoolScheduler> {
    let pool = ThreadPool::builder()
      .pool_size(self.pool_size)
      .name_prefix(self.name_prefix.clone())
      .create()?;
    let name = self.name_prefix.trim_end_matches('-').to_owned();
    tracing::debug!(scheduler = %name, workers = self.pool_size, "scheduler started");
    Ok(ThreadPoolScheduler {
      inner: Arc::new(PoolInner { name, pool: RwLock::new(Some(pool)) }),
    })
  }
}
