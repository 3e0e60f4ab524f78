use std::sync::Arc;

use crate::{disposable::Disposable, emitter::Emitter, observable::Observable, observer::Observer};

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Emit only those items from an Observable that pass a predicate test
  ///
  /// # Example
  ///
  /// ```
  /// use rxcore::prelude::*;
  /// use std::sync::{Arc, Mutex};
  ///
  /// let coll = Arc::new(Mutex::new(vec![]));
  /// let coll_clone = coll.clone();
  ///
  /// observable::from_iter(0..10)
  ///   .filter(|v| *v % 2 == 0)
  ///   .subscribe(move |v| coll_clone.lock().unwrap().push(v));
  ///
  /// // only even numbers received.
  /// assert_eq!(*coll.lock().unwrap(), vec![0, 2, 4, 6, 8]);
  /// ```
  pub fn filter<P>(self, predicate: P) -> Self
  where
    P: Fn(&Item) -> bool + Send + Sync + 'static,
  {
    self.filter_with_err(move |v| Ok(predicate(v)))
  }

  /// Like [`filter`](Observable::filter), but the predicate may fail. A
  /// failure is delivered as the stream's error.
  pub fn filter_with_err<P>(self, predicate: P) -> Self
  where
    P: Fn(&Item) -> Result<bool, Err> + Send + Sync + 'static,
  {
    let predicate = Arc::new(predicate);
    Observable::create(move |emitter: Emitter<Item, Err>| {
      let observer = FilterObserver { emitter: emitter.clone(), predicate: predicate.clone() };
      self.subscribe_child(observer, &emitter);
      Ok(())
    })
  }
}

struct FilterObserver<Item, Err, P> {
  emitter: Emitter<Item, Err>,
  predicate: Arc<P>,
}

impl<Item, Err, P> Observer<Item, Err> for FilterObserver<Item, Err, P>
where
  P: Fn(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) -> Result<(), Err> {
    if self.emitter.is_disposed() {
      return Ok(());
    }
    match (self.predicate)(&value) {
      Ok(true) => self.emitter.next(value),
      Ok(false) => {}
      Err(err) => self.emitter.error(err),
    }
    Ok(())
  }

  #[inline]
  fn error(&mut self, err: Err) { self.emitter.error(err) }

  #[inline]
  fn complete(&mut self) { self.emitter.complete() }
}
