use std::{
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
  },
  thread,
};

use super::{run_task, ScheduleError, Scheduler, Task};

/// Spawns a new named thread (`io-thread-N`) for every task.
///
/// Suited to blocking work that should not hold up a fixed pool.
#[derive(Debug, Clone, Default)]
pub struct IoScheduler {
  inner: Arc<IoInner>,
}

#[derive(Debug, Default)]
struct IoInner {
  spawned: AtomicUsize,
  shutdown: AtomicBool,
}

impl IoScheduler {
  pub fn new() -> Self { Self::default() }
}

impl Scheduler for IoScheduler {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    if self.inner.shutdown.load(Ordering::Acquire) {
      tracing::warn!(scheduler = "io", "task rejected, scheduler is shut down");
      return Err(ScheduleError::Shutdown);
    }
    let id = self.inner.spawned.fetch_add(1, Ordering::Relaxed);
    thread::Builder::new()
      .name(format!("io-thread-{id}"))
      .spawn(move || run_task(task))
      .map(drop)
      .map_err(|err| {
        tracing::warn!(scheduler = "io", %err, "failed to spawn worker, task dropped");
        ScheduleError::Spawn(Arc::new(err))
      })
  }

  fn shutdown(&self) {
    if !self.inner.shutdown.swap(true, Ordering::AcqRel) {
      tracing::debug!(scheduler = "io", "scheduler shut down");
    }
  }
}
