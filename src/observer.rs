//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use crate::unhandled::{self, FailureSource, UnhandledFailure};

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// Observers never see more than one terminal signal, and never see `next`
/// after one; the [`Emitter`](crate::emitter::Emitter) in front of every
/// observer enforces that, so implementations do not need to.
pub trait Observer<Item, Err> {
  /// Receive the next value.
  ///
  /// Returning `Err` is how an observer fails: the emitter turns it into a
  /// single call to [`Observer::error`] and stops the subscription.
  fn next(&mut self, value: Item) -> Result<(), Err>;

  /// Handle an error from the observable
  fn error(&mut self, err: Err);

  /// Handle completion of the observable
  fn complete(&mut self);
}

pub type BoxObserver<Item, Err> = Box<dyn Observer<Item, Err> + Send>;

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) -> Result<(), Err> { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
}

// ============================================================================
// FnObserver - Closure adapter
// ============================================================================

/// Observer built from three independent closures.
///
/// This is the end of a pipeline, so a panic inside any closure has nowhere to
/// go as an `error` signal; it is caught and handed to
/// [`unhandled::report`](crate::unhandled::report) instead.
#[derive(Clone)]
pub struct FnObserver<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { FnObserver { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for FnObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  fn next(&mut self, value: Item) -> Result<(), Err> {
    unhandled::catch(FailureSource::NextCallback, || (self.next)(value));
    Ok(())
  }

  fn error(&mut self, err: Err) {
    unhandled::catch(FailureSource::ErrorCallback, || (self.error)(err));
  }

  fn complete(&mut self) {
    unhandled::catch(FailureSource::CompleteCallback, || (self.complete)());
  }
}

/// Error handler used when a consumer subscribes without one.
pub(crate) fn missing_error_handler<Err: std::fmt::Debug>(err: Err) {
  unhandled::report(UnhandledFailure {
    source: FailureSource::MissingErrorHandler,
    message: format!("{err:?}"),
  });
}

// ============================================================================
// Tests
// ============================================================================
