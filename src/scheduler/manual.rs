use std::{
  collections::VecDeque,
  fmt::{Debug, Formatter},
};

use parking_lot::Mutex;

use super::{run_task, ScheduleError, Scheduler, Task};

/// Queues tasks until they are run explicitly.
///
/// Nothing happens on its own, which makes interleavings reproducible in
/// tests:
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let scheduler = Arc::new(ManualScheduler::new());
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// observable::from_iter(1..=3)
///   .observe_on(scheduler.clone())
///   .subscribe(move |v| c_seen.lock().unwrap().push(v));
///
/// assert!(seen.lock().unwrap().is_empty());
/// scheduler.flush();
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// ```
#[derive(Default)]
pub struct ManualScheduler {
  state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
  queue: VecDeque<Task>,
  shutdown: bool,
}

impl ManualScheduler {
  pub fn new() -> Self { Self::default() }

  /// Runs the oldest queued task. Returns `false` if there was none.
  pub fn run_one(&self) -> bool {
    // Popped before running: the task may schedule more work.
    let task = self.state.lock().queue.pop_front();
    match task {
      Some(task) => {
        run_task(task);
        true
      }
      None => false,
    }
  }

  /// Runs tasks until the queue is empty, including tasks scheduled by the
  /// tasks it runs. Returns how many ran.
  pub fn flush(&self) -> usize {
    let mut ran = 0;
    while self.run_one() {
      ran += 1;
    }
    ran
  }

  pub fn pending(&self) -> usize { self.state.lock().queue.len() }
}

impl Scheduler for ManualScheduler {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    let mut state = self.state.lock();
    if state.shutdown {
      tracing::warn!(scheduler = "manual", "task rejected, scheduler is shut down");
      return Err(ScheduleError::Shutdown);
    }
    state.queue.push_back(task);
    Ok(())
  }

  /// Already queued tasks can still be run.
  fn shutdown(&self) { self.state.lock().shutdown = true; }
}

impl Debug for ManualScheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.state.lock();
    f.debug_struct("ManualScheduler")
      .field("pending", &state.queue.len())
      .field("shutdown", &state.shutdown)
      .finish()
  }
}
