use crate::{emitter::Emitter, observable::Observable};

/// Creates an observable producing a single value, then completing.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::just(123).subscribe(|v| println!("{},", v));
/// ```
pub fn just<Item>(value: Item) -> Observable<Item>
where
  Item: Clone + Send + Sync + 'static,
{
  Observable::just(value)
}

impl<Item, Err> Observable<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Send + 'static,
{
  /// Emits `value` once and completes. Each subscriber gets its own clone.
  pub fn just(value: Item) -> Self {
    Observable::create(move |emitter: Emitter<Item, Err>| {
      emitter.next(value.clone());
      emitter.complete();
      Ok(())
    })
  }
}
