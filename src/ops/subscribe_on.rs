use std::sync::Arc;

use crate::{
  disposable::Disposable,
  emitter::Emitter,
  observable::Observable,
  scheduler::{ScheduleError, Scheduler},
};

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Subscribes to the upstream from a task on `scheduler`.
  ///
  /// All the synchronous work the upstream does while being subscribed runs
  /// on the scheduler, so `subscribe` returns right away. Where later values
  /// are delivered is up to the upstream; use
  /// [`observe_on`](Observable::observe_on) to move those.
  ///
  /// Disposing before the task runs means the upstream is never subscribed.
  /// If the scheduler rejects the task, the subscription fails with that
  /// [`ScheduleError`].
  pub fn subscribe_on<S>(self, scheduler: S) -> Observable<Item, Err>
  where
    S: Scheduler + 'static,
    Err: From<ScheduleError>,
  {
    let scheduler = Arc::new(scheduler);
    Observable::create(move |emitter: Emitter<Item, Err>| {
      let upstream = self.clone();
      scheduler
        .schedule(Box::new(move || {
          if emitter.is_disposed() {
            return;
          }
          upstream.subscribe_child(emitter.clone(), &emitter);
        }))
        .map_err(Into::into)
    })
  }
}
