use crate::{emitter::Emitter, error::RxError, observable::Observable};

/// Creates an observable that completes without emitting anything.
pub fn empty<Item: Send + 'static>() -> Observable<Item> { Observable::empty() }

/// Creates an observable that never emits and never terminates.
pub fn never<Item: Send + 'static>() -> Observable<Item> { Observable::never() }

/// Creates an observable that fails immediately with `err`.
pub fn throw<Item: Send + 'static>(err: RxError) -> Observable<Item> { Observable::throw(err) }

impl<Item, Err> Observable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  pub fn empty() -> Self {
    Observable::create(|emitter: Emitter<Item, Err>| {
      emitter.complete();
      Ok(())
    })
  }

  pub fn never() -> Self { Observable::create(|_: Emitter<Item, Err>| Ok(())) }

  pub fn throw(err: Err) -> Self
  where
    Err: Clone + Sync,
  {
    Observable::create(move |_: Emitter<Item, Err>| Err(err.clone()))
  }
}
