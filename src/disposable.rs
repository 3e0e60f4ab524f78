//! Cancellation handles.
//!
//! A [`Disposable`] is anything that can be cancelled exactly once. Cancelling
//! is idempotent and thread-safe: the first caller performs the cleanup, every
//! later call is a no-op.

use std::{
  any::Any,
  fmt::{Debug, Formatter},
  mem,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;

pub trait Disposable {
  /// Cancels the resource. Calling it again has no additional effect.
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

pub type BoxDisposable = Box<dyn Disposable + Send + Sync>;

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// Runs a teardown closure the first time it is disposed.
pub struct FnDisposable<F> {
  disposed: AtomicBool,
  teardown: Mutex<Option<F>>,
}

/// Wraps `teardown` into a [`Disposable`].
///
/// ```
/// use rxcore::disposable::{self, Disposable};
/// use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let c_calls = calls.clone();
/// let d = disposable::from_fn(move || {
///   c_calls.fetch_add(1, Ordering::SeqCst);
/// });
/// d.dispose();
/// d.dispose();
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub fn from_fn<F: FnOnce() + Send>(teardown: F) -> FnDisposable<F> {
  FnDisposable {
    disposed: AtomicBool::new(false),
    teardown: Mutex::new(Some(teardown)),
  }
}

impl<F: FnOnce()> Disposable for FnDisposable<F> {
  fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::AcqRel) {
      if let Some(teardown) = self.teardown.lock().take() {
        teardown();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

/// A thread-safe set of disposables, fanned out on dispose.
///
/// Once disposed, anything added later is disposed on the spot instead of
/// being stored, so no live resource can hide inside a cancelled composite.
#[derive(Clone, Default)]
pub struct CompositeDisposable(Arc<Inner>);

#[derive(Default)]
struct Inner {
  disposed: AtomicBool,
  teardown: Mutex<SmallVec<[BoxDisposable; 2]>>,
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  /// Adds `child`, or disposes it immediately if this composite is already
  /// disposed. Children that have already been disposed are pruned.
  pub fn add<D>(&self, child: D)
  where
    D: Disposable + Send + Sync + 'static,
  {
    if self.is_same(&child) {
      return;
    }
    let mut teardown = self.0.teardown.lock();
    // Checked under the lock: `dispose` flips the flag before draining.
    if self.0.disposed.load(Ordering::Acquire) {
      drop(teardown);
      child.dispose();
    } else {
      teardown.retain(|d| !d.is_disposed());
      teardown.push(Box::new(child));
    }
  }

  /// Number of children currently held.
  pub fn len(&self) -> usize { self.0.teardown.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn is_same(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<Self>()
      .is_some_and(|other| Arc::ptr_eq(&self.0, &other.0))
  }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    if !self.0.disposed.swap(true, Ordering::AcqRel) {
      let children = mem::take(&mut *self.0.teardown.lock());
      // Outside the lock, a child may add to this composite while tearing down.
      for child in children {
        child.dispose();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.disposed.load(Ordering::Acquire) }
}

impl Debug for CompositeDisposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompositeDisposable")
      .field("disposed", &self.is_disposed())
      .field("teardown_count", &self.len())
      .finish()
  }
}
