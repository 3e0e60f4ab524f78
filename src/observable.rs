//! The [`Observable`] type and the subscription protocol.
//!
//! An observable is an immutable description of how to push values into an
//! [`Emitter`]. Nothing runs until `subscribe*` is called, and every call runs
//! the producer again from scratch with its own emitter (cold semantics).

use std::{fmt::Debug, sync::Arc};

use crate::{
  emitter::Emitter,
  error::RxError,
  observer::{missing_error_handler, FnObserver, Observer},
  subscription::Subscription,
};

mod from_iter;
mod of;
mod trivial;

pub use from_iter::from_iter;
pub use of::just;
pub use trivial::{empty, never, throw};

type SubscribeFn<Item, Err> = dyn Fn(Emitter<Item, Err>) -> Result<(), Err> + Send + Sync;

/// A lazy, re-subscribable stream of `Item`s that may fail with `Err`.
///
/// Cloning is cheap and shares the producer, not any emitted values.
pub struct Observable<Item, Err = RxError> {
  source: Arc<SubscribeFn<Item, Err>>,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Observable { source: self.source.clone() } }
}

/// Creates an observable from a producer function.
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// observable::create(|emitter: Emitter<i32>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
///   Ok(())
/// })
/// .subscribe(move |v| c_seen.lock().unwrap().push(v));
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub fn create<Item, F>(subscribe: F) -> Observable<Item>
where
  Item: Send + 'static,
  F: Fn(Emitter<Item>) -> Result<(), RxError> + Send + Sync + 'static,
{
  Observable::create(subscribe)
}

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Creates an observable from a producer function.
  ///
  /// The function runs once per subscription. Returning `Err` is the same as
  /// calling `emitter.error(..)`: the failure is delivered to the observer
  /// instead of escaping `subscribe`.
  pub fn create<F>(subscribe: F) -> Self
  where
    F: Fn(Emitter<Item, Err>) -> Result<(), Err> + Send + Sync + 'static,
  {
    Observable { source: Arc::new(subscribe) }
  }

  /// Subscribes `observer`, running the producer with a fresh emitter.
  pub fn subscribe_observer<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let emitter = Emitter::new(observer);
    self.run(emitter.clone());
    Subscription::new(emitter)
  }

  /// Subscribes `observer` on behalf of `parent`.
  ///
  /// The new subscription is tied to `parent` before the producer starts, so
  /// disposing `parent` reaches a producer that is still running
  /// synchronously.
  pub(crate) fn subscribe_child<O, P, PErr>(&self, observer: O, parent: &Emitter<P, PErr>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let emitter = Emitter::new(observer);
    parent.add(emitter.clone());
    self.run(emitter);
  }

  fn run(&self, emitter: Emitter<Item, Err>) {
    tracing::trace!("subscribe");
    if let Err(err) = (self.source)(emitter.clone()) {
      emitter.error(err);
    }
  }

  /// Subscribes with separate callbacks for values, errors and completion.
  ///
  /// A panic inside any callback is reported to
  /// [`unhandled`](crate::unhandled) rather than turned into a signal.
  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(Err) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(FnObserver::new(next, error, complete))
  }

  pub fn subscribe_err<N, E>(&self, next: N, error: E) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(Err) + Send + 'static,
  {
    self.subscribe_all(next, error, || {})
  }

  /// Subscribes with a value callback only.
  ///
  /// An error reaching this subscriber has no handler; it is reported to
  /// [`unhandled`](crate::unhandled) instead of being dropped.
  pub fn subscribe<N>(&self, next: N) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    Err: Debug,
  {
    self.subscribe_all(next, missing_error_handler, || {})
  }
}
