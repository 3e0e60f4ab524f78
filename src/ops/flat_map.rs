//! Merges a stream of streams into one.
//!
//! Every outer item is mapped to an inner observable, which is subscribed
//! right away; all inner emissions are forwarded downstream as they arrive.
//! Items from one inner stream keep their order, items from different inner
//! streams interleave freely.
//!
//! Completion is tracked by a counter that starts at one for the outer
//! subscription. Each inner subscription increments it *before* it is
//! subscribed, so an inner stream that completes synchronously can never
//! drive the counter to zero while the outer stream is still running.
//!
//! The downstream emitter holds every subscription handle (outer and each
//! inner). The first error, from anywhere, is delivered and terminates that
//! emitter, which disposes all of them; disposing the flat_map subscription
//! does the same.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{disposable::Disposable, emitter::Emitter, observable::Observable, observer::Observer};

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Maps every item to an observable and merges their emissions.
  ///
  /// ```
  /// use rxcore::prelude::*;
  /// use std::sync::{Arc, Mutex};
  ///
  /// let chars = Arc::new(Mutex::new(vec![]));
  /// let c_chars = chars.clone();
  /// observable::from_iter(vec!["Hi", "Go"])
  ///   .flat_map(|s| observable::from_iter(s.chars().collect::<Vec<_>>()))
  ///   .subscribe(move |c| c_chars.lock().unwrap().push(c));
  ///
  /// assert_eq!(*chars.lock().unwrap(), vec!['H', 'i', 'G', 'o']);
  /// ```
  pub fn flat_map<B, F>(self, f: F) -> Observable<B, Err>
  where
    B: Send + 'static,
    F: Fn(Item) -> Observable<B, Err> + Send + Sync + 'static,
  {
    self.flat_map_with_err(move |v| Ok(f(v)))
  }

  /// Like [`flat_map`](Observable::flat_map), but the mapper may fail. A
  /// failure is handled like an error from any inner stream.
  pub fn flat_map_with_err<B, F>(self, f: F) -> Observable<B, Err>
  where
    B: Send + 'static,
    F: Fn(Item) -> Result<Observable<B, Err>, Err> + Send + Sync + 'static,
  {
    let mapper = Arc::new(f);
    Observable::create(move |emitter: Emitter<B, Err>| {
      let active = Arc::new(AtomicUsize::new(1));
      let outer = OuterObserver { emitter: emitter.clone(), mapper: mapper.clone(), active };
      self.subscribe_child(outer, &emitter);
      Ok(())
    })
  }
}

struct OuterObserver<B, Err, F> {
  emitter: Emitter<B, Err>,
  mapper: Arc<F>,
  active: Arc<AtomicUsize>,
}

struct InnerObserver<B, Err> {
  emitter: Emitter<B, Err>,
  active: Arc<AtomicUsize>,
}

/// Releases one slot; the last one out completes downstream.
fn release<B, Err>(active: &AtomicUsize, emitter: &Emitter<B, Err>) {
  if active.fetch_sub(1, Ordering::AcqRel) == 1 {
    emitter.complete();
  }
}

impl<Item, B, Err, F> Observer<Item, Err> for OuterObserver<B, Err, F>
where
  B: Send + 'static,
  Err: Send + 'static,
  F: Fn(Item) -> Result<Observable<B, Err>, Err>,
{
  fn next(&mut self, value: Item) -> Result<(), Err> {
    if self.emitter.is_disposed() {
      return Ok(());
    }
    self.active.fetch_add(1, Ordering::AcqRel);
    match (self.mapper)(value) {
      Ok(inner) => {
        let observer = InnerObserver { emitter: self.emitter.clone(), active: self.active.clone() };
        inner.subscribe_child(observer, &self.emitter);
      }
      Err(err) => self.emitter.error(err),
    }
    Ok(())
  }

  #[inline]
  fn error(&mut self, err: Err) { self.emitter.error(err) }

  #[inline]
  fn complete(&mut self) { release(&self.active, &self.emitter) }
}

impl<B, Err> Observer<B, Err> for InnerObserver<B, Err> {
  fn next(&mut self, value: B) -> Result<(), Err> {
    if !self.emitter.is_disposed() {
      self.emitter.next(value);
    }
    Ok(())
  }

  #[inline]
  fn error(&mut self, err: Err) { self.emitter.error(err) }

  #[inline]
  fn complete(&mut self) { release(&self.active, &self.emitter) }
}
