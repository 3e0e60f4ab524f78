//! Where work runs.
//!
//! The core never creates threads itself. Operators that move work around
//! ([`subscribe_on`](crate::observable::Observable::subscribe_on) and
//! [`observe_on`](crate::observable::Observable::observe_on)) only hand boxed
//! tasks to a [`Scheduler`]. A handful of ready-made schedulers live in the
//! submodules; anything that can run a `FnOnce` later can be one.

use crate::unhandled::{self, FailureSource};

pub use crate::error::ScheduleError;

mod immediate;
mod io;
mod manual;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;

pub use immediate::ImmediateScheduler;
pub use io::IoScheduler;
pub use manual::ManualScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::{ThreadPoolScheduler, ThreadPoolSchedulerBuilder};

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// An object that runs tasks, usually on some other thread.
///
/// `schedule` must not block the caller beyond enqueueing the task. After
/// `shutdown`, newly scheduled tasks are rejected with
/// [`ScheduleError::Shutdown`] and dropped; operators turn that into the
/// subscription's error.
pub trait Scheduler: Send + Sync {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError>;

  /// Stops accepting tasks and releases workers once queued work is done.
  /// Calling it more than once has no further effect.
  fn shutdown(&self);
}

impl<S: Scheduler + ?Sized> Scheduler for std::sync::Arc<S> {
  #[inline]
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> { (**self).schedule(task) }
  #[inline]
  fn shutdown(&self) { (**self).shutdown() }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
  #[inline]
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> { (**self).schedule(task) }
  #[inline]
  fn shutdown(&self) { (**self).shutdown() }
}

/// Runs `task`, reporting a panic instead of unwinding into the worker.
pub(crate) fn run_task(task: Task) { unhandled::catch(FailureSource::ScheduledTask, task) }

/// A raw `futures` pool has no shutdown of its own; its workers exit when the
/// last handle to it is dropped.
#[cfg(feature = "futures-scheduler")]
impl Scheduler for futures::executor::ThreadPool {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    self.spawn_ok(futures::future::lazy(move |_| run_task(task)));
    Ok(())
  }

  fn shutdown(&self) {}
}

/// Tasks go to tokio's blocking pool, since they are plain synchronous
/// closures that may run for a long time.
#[cfg(feature = "tokio-scheduler")]
impl Scheduler for tokio::runtime::Handle {
  fn schedule(&self, task: Task) -> Result<(), ScheduleError> {
    drop(self.spawn_blocking(move || run_task(task)));
    Ok(())
  }

  fn shutdown(&self) {}
}
