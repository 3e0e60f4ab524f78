use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

use crate::disposable::Disposable;

/// Handle returned from `Observable::subscribe*`, used to cancel the
/// subscription before it terminates on its own.
#[derive(Clone)]
pub struct Subscription(Arc<dyn Disposable + Send + Sync>);

impl Subscription {
  pub fn new<D>(disposable: D) -> Self
  where
    D: Disposable + Send + Sync + 'static,
  {
    Subscription(Arc::new(disposable))
  }

  /// Activates "RAII" behavior for this subscription. That means `dispose()`
  /// will be called automatically as soon as the returned value goes out of
  /// scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `dispose()` is called immediately, which is probably not what you want!
  pub fn dispose_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard(self) }
}

impl Disposable for Subscription {
  #[inline]
  fn dispose(&self) { self.0.dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_disposed", &self.is_disposed())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be disposed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Disposable>(pub(crate) T);

impl<T: Disposable> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }

  /// Borrows the guarded subscription.
  pub fn inner(&self) -> &T { &self.0 }
}

impl<T: Disposable> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.dispose() }
}
