use std::sync::atomic::{AtomicBool, Ordering};

use super::{run_task, ScheduleError, Scheduler, Task};

/// Runs every task inline, on the thread that schedules it.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
  shutdown: AtomicBool,
}

impl ImmediateScheduler {
  pub fn new() -> Self { Self::default() }
}

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    if self.shutdown.load(Ordering::Acquire) {
      tracing::warn!(scheduler = "immediate", "task rejected, scheduler is shut down");
      return Err(ScheduleError::Shutdown);
    }
    run_task(task);
    Ok(())
  }

  fn shutdown(&self) { self.shutdown.store(true, Ordering::Release); }
}
