use crate::{disposable::Disposable, emitter::Emitter, observable::Observable};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. The iterator is cloned for
/// every subscription, and emission stops early once the subscription is
/// disposed.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> Observable<Iter::Item>
where
  Iter: IntoIterator + Clone + Send + Sync + 'static,
  Iter::Item: Send + 'static,
{
  Observable::from_iter(iter)
}

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  pub fn from_iter<Iter>(iter: Iter) -> Self
  where
    Iter: IntoIterator<Item = Item> + Clone + Send + Sync + 'static,
  {
    Observable::create(move |emitter: Emitter<Item, Err>| {
      for v in iter.clone() {
        if emitter.is_disposed() {
          return Ok(());
        }
        emitter.next(v);
      }
      emitter.complete();
      Ok(())
    })
  }
}
