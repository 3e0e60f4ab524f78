//! Moves delivery of every signal onto a scheduler.
//!
//! Each subscription gets one dispatcher with a private FIFO queue. Signals
//! from upstream are appended to it, and at most one drain task is ever
//! queued on the scheduler. A drain delivers the batch it found when it
//! started, then either reschedules itself (new signals arrived meanwhile) or
//! marks itself idle. Because no two drains of the same dispatcher can run at
//! once, order is kept even on a pool with many workers.
//!
//! If the scheduler refuses a drain, whatever is still queued is dropped and
//! the subscription fails with the [`ScheduleError`].

use std::{collections::VecDeque, mem, sync::Arc};

use parking_lot::Mutex;

use crate::{
  disposable::Disposable,
  emitter::Emitter,
  observable::Observable,
  observer::Observer,
  scheduler::{ScheduleError, Scheduler},
};

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Re-emits every signal from a task on `scheduler`.
  ///
  /// The upstream is subscribed on the calling thread. Signals still queued
  /// when the subscription is disposed are dropped.
  pub fn observe_on<S>(self, scheduler: S) -> Observable<Item, Err>
  where
    S: Scheduler + 'static,
    Err: From<ScheduleError>,
  {
    let scheduler: Arc<dyn Scheduler> = Arc::new(scheduler);
    Observable::create(move |emitter: Emitter<Item, Err>| {
      let dispatcher = Arc::new(Dispatcher {
        downstream: emitter.clone(),
        scheduler: scheduler.clone(),
        queue: Mutex::new(DispatchQueue { pending: VecDeque::new(), scheduled: false }),
      });
      self.subscribe_child(ObserveOnObserver { dispatcher }, &emitter);
      Ok(())
    })
  }
}

enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

struct DispatchQueue<Item, Err> {
  pending: VecDeque<Notification<Item, Err>>,
  /// A drain task is queued or running.
  scheduled: bool,
}

struct Dispatcher<Item, Err> {
  downstream: Emitter<Item, Err>,
  scheduler: Arc<dyn Scheduler>,
  queue: Mutex<DispatchQueue<Item, Err>>,
}

impl<Item, Err> Dispatcher<Item, Err>
where
  Item: Send + 'static,
  Err: From<ScheduleError> + Send + 'static,
{
  fn push(self: &Arc<Self>, notification: Notification<Item, Err>) {
    if self.downstream.is_disposed() {
      return;
    }
    let mut queue = self.queue.lock();
    queue.pending.push_back(notification);
    if !queue.scheduled {
      queue.scheduled = true;
      drop(queue);
      self.schedule_drain();
    }
  }

  fn schedule_drain(self: &Arc<Self>) {
    let this = self.clone();
    if let Err(err) = self.scheduler.schedule(Box::new(move || this.drain())) {
      let mut queue = self.queue.lock();
      queue.pending.clear();
      queue.scheduled = false;
      drop(queue);
      self.downstream.error(err.into());
    }
  }

  fn drain(self: Arc<Self>) {
    let batch = mem::take(&mut self.queue.lock().pending);
    for notification in batch {
      if self.downstream.is_disposed() {
        break;
      }
      match notification {
        Notification::Next(value) => self.downstream.next(value),
        Notification::Error(err) => self.downstream.error(err),
        Notification::Complete => self.downstream.complete(),
      }
    }

    let mut queue = self.queue.lock();
    if self.downstream.is_disposed() {
      queue.pending.clear();
      queue.scheduled = false;
    } else if queue.pending.is_empty() {
      queue.scheduled = false;
    } else {
      drop(queue);
      self.schedule_drain();
    }
  }
}

struct ObserveOnObserver<Item, Err> {
  dispatcher: Arc<Dispatcher<Item, Err>>,
}

impl<Item, Err> Observer<Item, Err> for ObserveOnObserver<Item, Err>
where
  Item: Send + 'static,
  Err: From<ScheduleError> + Send + 'static,
{
  fn next(&mut self, value: Item) -> Result<(), Err> {
    self.dispatcher.push(Notification::Next(value));
    Ok(())
  }

  fn error(&mut self, err: Err) { self.dispatcher.push(Notification::Error(err)) }

  fn complete(&mut self) { self.dispatcher.push(Notification::Complete) }
}
