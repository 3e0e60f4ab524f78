use std::sync::Arc;

use crate::{disposable::Disposable, emitter::Emitter, observable::Observable, observer::Observer};

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  pub fn map<B, F>(self, f: F) -> Observable<B, Err>
  where
    B: Send + 'static,
    F: Fn(Item) -> B + Send + Sync + 'static,
  {
    self.map_with_err(move |v| Ok(f(v)))
  }

  /// Like [`map`](Observable::map), but the closure may fail. A failure is
  /// delivered as the stream's error and nothing else is emitted.
  pub fn map_with_err<B, F>(self, f: F) -> Observable<B, Err>
  where
    B: Send + 'static,
    F: Fn(Item) -> Result<B, Err> + Send + Sync + 'static,
  {
    let map = Arc::new(f);
    Observable::create(move |emitter: Emitter<B, Err>| {
      self.subscribe_child(MapObserver { emitter: emitter.clone(), map: map.clone() }, &emitter);
      Ok(())
    })
  }
}

struct MapObserver<B, Err, M> {
  emitter: Emitter<B, Err>,
  map: Arc<M>,
}

impl<Item, B, Err, M> Observer<Item, Err> for MapObserver<B, Err, M>
where
  M: Fn(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) -> Result<(), Err> {
    if self.emitter.is_disposed() {
      return Ok(());
    }
    match (self.map)(value) {
      Ok(v) => self.emitter.next(v),
      Err(err) => self.emitter.error(err),
    }
    Ok(())
  }

  #[inline]
  fn error(&mut self, err: Err) { self.emitter.error(err) }

  #[inline]
  fn complete(&mut self) { self.emitter.complete() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  #[test]
  fn primitive_type() {
    let i = Arc::new(AtomicUsize::new(0));
    let c_i = i.clone();
    observable::from_iter(100..101usize)
      .map(|v| v * 2)
      .subscribe(move |v| {
        c_i.fetch_add(v, Ordering::SeqCst);
      });
    assert_eq!(i.load(Ordering::SeqCst), 200);
  }

  #[test]
  fn map_types_mixed() {
    let i = Arc::new(AtomicUsize::new(0));
    let c_i = i.clone();
    observable::from_iter(vec!['a', 'b', 'c'])
      .map(|_v| 1usize)
      .subscribe(move |v| {
        c_i.fetch_add(v, Ordering::SeqCst);
      });
    assert_eq!(i.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn failure_halts_partial_results() {
    let values = Arc::new(Mutex::new(vec![]));
    let error = Arc::new(Mutex::new(None));
    let completed = Arc::new(AtomicUsize::new(0));
    let (c_values, c_error, c_completed) = (values.clone(), error.clone(), completed.clone());

    observable::from_iter(vec![1, 2])
      .map_with_err(|x| if x == 2 { Err(RxError::msg("bad")) } else { Ok(x) })
      .subscribe_all(
        move |v| c_values.lock().unwrap().push(v),
        move |e| *c_error.lock().unwrap() = Some(e.to_string()),
        move || {
          c_completed.fetch_add(1, Ordering::SeqCst);
        },
      );

    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert_eq!(error.lock().unwrap().as_deref(), Some("bad"));
    assert_eq!(completed.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn failure_disposes_upstream() {
    let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::new(Mutex::new(None));
    let c_slot = slot.clone();
    observable::create(move |emitter: Emitter<i32>| {
      *c_slot.lock().unwrap() = Some(emitter);
      Ok(())
    })
    .map_with_err(|_| Err::<i32, _>(RxError::msg("always")))
    .subscribe_err(|_| {}, |_| {});

    let upstream = slot.lock().unwrap().take().unwrap();
    assert!(!upstream.is_disposed());
    upstream.next(1);
    assert!(upstream.is_disposed());
  }

  #[test]
  fn skips_work_once_disposed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c_calls = calls.clone();
    let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::new(Mutex::new(None));
    let c_slot = slot.clone();

    let subscription = observable::create(move |emitter: Emitter<i32>| {
      *c_slot.lock().unwrap() = Some(emitter);
      Ok(())
    })
    .map(move |v| {
      c_calls.fetch_add(1, Ordering::SeqCst);
      v
    })
    .subscribe(|_| {});

    let upstream = slot.lock().unwrap().take().unwrap();
    upstream.next(1);
    subscription.dispose();
    upstream.next(2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(upstream.is_disposed());
  }
}
