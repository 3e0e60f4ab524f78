//! The guarded, per-subscription sink handed to producers.
//!
//! Every subscription gets exactly one [`Emitter`]. It sits between the
//! producer and the observer and owns the subscription's state machine:
//!
//! ```text
//! Active ──complete──▶ Completed
//!    │ └────error─────▶ Errored
//!    └──────dispose───▶ Disposed   (reachable from every state)
//! ```
//!
//! Only `Active` delivers anything. Terminal signals are delivered at most
//! once, and `next` is never delivered after one. Operators rely on this
//! instead of re-implementing it.
//!
//! Cancellation is cooperative: disposing stops delivery, but a producer that
//! is already running keeps running until it polls [`Emitter::is_disposed`].
//!
//! Signals are serialized. A signal raised on the delivering thread from
//! inside the observer (re-entrant `next`, `complete` or `error`) is queued
//! and delivered by the outer call once the current callback returns, so
//! the observer never runs nested inside itself.

use std::{
  cell::RefCell,
  collections::VecDeque,
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
  },
};

use parking_lot::ReentrantMutex;

use crate::{
  disposable::{CompositeDisposable, Disposable},
  error::RxError,
  observer::{BoxObserver, Observer},
};

const ACTIVE: u8 = 0;
const COMPLETED: u8 = 1;
const ERRORED: u8 = 2;
const DISPOSED: u8 = 3;

/// Observable lifecycle of an [`Emitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
  Active,
  Completed,
  Errored,
  Disposed,
}

pub struct Emitter<Item, Err = RxError> {
  inner: Arc<EmitterInner<Item, Err>>,
}

struct EmitterInner<Item, Err> {
  state: AtomicU8,
  slot: ReentrantMutex<Slot<Item, Err>>,
  resources: CompositeDisposable,
}

/// Guarded by the re-entrant lock. `observer` stays mutably borrowed for the
/// whole of a delivery, which is how a nested call on the same thread tells
/// that it has to queue.
struct Slot<Item, Err> {
  observer: RefCell<Option<BoxObserver<Item, Err>>>,
  queued: RefCell<VecDeque<Signal<Item, Err>>>,
}

enum Signal<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Clone for Emitter<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Emitter { inner: self.inner.clone() } }
}

impl<Item, Err> Emitter<Item, Err> {
  pub(crate) fn new<O>(observer: O) -> Self
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    Emitter {
      inner: Arc::new(EmitterInner {
        state: AtomicU8::new(ACTIVE),
        slot: ReentrantMutex::new(Slot {
          observer: RefCell::new(Some(Box::new(observer))),
          queued: RefCell::new(VecDeque::new()),
        }),
        resources: CompositeDisposable::new(),
      }),
    }
  }

  /// Pushes a value downstream. Dropped unless the emitter is still active.
  ///
  /// If the observer fails on this value, the failure becomes this
  /// subscription's `error` signal. Called from inside the observer, the
  /// value is delivered right after the current callback returns.
  pub fn next(&self, value: Item) { self.signal(Signal::Next(value)) }

  /// Delivers `err` and moves to `Errored`. No-op unless active.
  pub fn error(&self, err: Err) { self.signal(Signal::Error(err)) }

  /// Delivers completion and moves to `Completed`. No-op unless active.
  pub fn complete(&self) { self.signal(Signal::Complete) }

  /// Ties `resource` to this subscription: it is disposed when the
  /// subscription is disposed or terminates, or right away if that already
  /// happened.
  pub fn add<D>(&self, resource: D)
  where
    D: Disposable + Send + Sync + 'static,
  {
    self.inner.resources.add(resource);
  }

  /// Current state. Inside a terminal callback this already reports the
  /// terminal state.
  pub fn state(&self) -> EmitterState {
    match self.inner.state.load(Ordering::Acquire) {
      ACTIVE => EmitterState::Active,
      COMPLETED => EmitterState::Completed,
      ERRORED => EmitterState::Errored,
      _ => EmitterState::Disposed,
    }
  }

  #[inline]
  fn is_active(&self) -> bool { self.inner.state.load(Ordering::Acquire) == ACTIVE }

  fn signal(&self, signal: Signal<Item, Err>) {
    if !self.is_active() {
      return;
    }
    let slot = self.inner.slot.lock();
    let Ok(mut observer) = slot.observer.try_borrow_mut() else {
      slot.queued.borrow_mut().push_back(signal);
      return;
    };
    let mut pending = Some(signal);
    while let Some(signal) = pending {
      self.deliver(&mut observer, signal);
      pending = slot.queued.borrow_mut().pop_front();
    }
    drop(observer);
    drop(slot);
    // A `dispose` that lost the race for the lock left the observer to us.
    if !self.is_active() {
      self.release();
    }
  }

  fn deliver(&self, observer: &mut Option<BoxObserver<Item, Err>>, signal: Signal<Item, Err>) {
    match signal {
      Signal::Next(value) => {
        if !self.is_active() {
          return;
        }
        let Some(target) = observer.as_mut() else { return };
        if let Err(err) = target.next(value) {
          if let Some(mut target) = self.claim(observer, ERRORED) {
            target.error(err);
            self.finish();
          }
        }
      }
      Signal::Error(err) => {
        if let Some(mut target) = self.claim(observer, ERRORED) {
          target.error(err);
          self.finish();
        }
      }
      Signal::Complete => {
        if let Some(mut target) = self.claim(observer, COMPLETED) {
          target.complete();
          self.finish();
        }
      }
    }
  }

  /// Moves to `terminal` and hands out the observer; only one caller wins.
  fn claim(
    &self,
    observer: &mut Option<BoxObserver<Item, Err>>,
    terminal: u8,
  ) -> Option<BoxObserver<Item, Err>> {
    self
      .inner
      .state
      .compare_exchange(ACTIVE, terminal, Ordering::AcqRel, Ordering::Acquire)
      .ok()?;
    observer.take()
  }

  fn finish(&self) {
    tracing::trace!(state = ?self.state(), "subscription terminated");
    self.inner.resources.dispose();
  }

  /// Drops the observer and anything still queued, unless a delivery holds
  /// them. That delivery calls back in here once it is done.
  fn release(&self) {
    let Some(slot) = self.inner.slot.try_lock() else { return };
    let Ok(mut observer) = slot.observer.try_borrow_mut() else { return };
    observer.take();
    slot.queued.borrow_mut().clear();
  }
}

impl<Item, Err> Disposable for Emitter<Item, Err> {
  fn dispose(&self) {
    if self.inner.state.swap(DISPOSED, Ordering::AcqRel) == DISPOSED {
      return;
    }
    tracing::trace!("subscription disposed");
    self.inner.resources.dispose();
    // Never block here: dispose is allowed from inside the observer itself.
    self.release();
  }

  #[inline]
  fn is_disposed(&self) -> bool { !self.is_active() }
}

/// Lets an emitter stand in as the observer of another stream, forwarding
/// every signal through its own guards.
impl<Item, Err> Observer<Item, Err> for Emitter<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) -> Result<(), Err> {
    Emitter::next(self, value);
    Ok(())
  }

  #[inline]
  fn error(&mut self, err: Err) { Emitter::error(self, err) }

  #[inline]
  fn complete(&mut self) { Emitter::complete(self) }
}

impl<Item, Err> Debug for Emitter<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Emitter")
      .field("state", &self.state())
      .field("resources", &self.inner.resources)
      .finish()
  }
}
