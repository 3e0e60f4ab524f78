//! Process-wide sink for failures that have nobody left to report to.
//!
//! A failure raised inside a terminal consumer callback cannot become an
//! `error` signal: the consumer *is* the end of the pipeline. Such failures
//! (and errors that reach a consumer without an error handler, and panics in
//! scheduled tasks) are routed here instead of being dropped.
//!
//! Without a hook installed every failure is logged with `tracing::error!`.

use std::{
  any::Any,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Where an unhandled failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
  /// The consumer's `next` callback panicked.
  NextCallback,
  /// The consumer's `error` callback panicked.
  ErrorCallback,
  /// The consumer's `complete` callback panicked.
  CompleteCallback,
  /// An error reached a consumer that was subscribed without an error handler.
  MissingErrorHandler,
  /// A task running on a scheduler worker panicked.
  ScheduledTask,
}

/// A failure that could not be delivered as a terminal signal.
#[derive(Debug, Clone)]
pub struct UnhandledFailure {
  pub source: FailureSource,
  pub message: String,
}

pub type Hook = Arc<dyn Fn(&UnhandledFailure) + Send + Sync>;

static HOOK: Lazy<RwLock<Option<Hook>>> = Lazy::new(|| RwLock::new(None));

/// Installs `hook` as the unhandled-failure sink, replacing any previous one.
pub fn set_hook<F>(hook: F)
where
  F: Fn(&UnhandledFailure) + Send + Sync + 'static,
{
  *HOOK.write() = Some(Arc::new(hook));
}

/// Removes the installed hook, restoring the logging default.
pub fn take_hook() -> Option<Hook> { HOOK.write().take() }

/// Hands `failure` to the installed hook, or logs it.
pub fn report(failure: UnhandledFailure) {
  // Clone out of the lock so a hook that itself reports cannot deadlock.
  let hook = HOOK.read().clone();
  match hook {
    Some(hook) => hook(&failure),
    None => tracing::error!(
      source = ?failure.source,
      "unhandled failure: {}",
      failure.message
    ),
  }
}

/// Runs `f`, reporting a panic instead of unwinding into the caller.
pub(crate) fn catch<F: FnOnce()>(source: FailureSource, f: F) {
  if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
    report(UnhandledFailure { source, message: panic_message(payload.as_ref()) });
  }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(msg) = payload.downcast_ref::<&str>() {
    (*msg).to_string()
  } else if let Some(msg) = payload.downcast_ref::<String>() {
    msg.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

/// Installs (once) a hook that records every failure, and returns a snapshot.
///
/// Tests run in parallel inside one process, so each test should look for a
/// message unique to itself rather than assert on the whole list.
#[cfg(test)]
pub(crate) fn recorded() -> Vec<UnhandledFailure> {
  use parking_lot::Mutex;

  static RECORDED: Lazy<Arc<Mutex<Vec<UnhandledFailure>>>> = Lazy::new(|| {
    let store = Arc::new(Mutex::new(Vec::new()));
    let c_store = store.clone();
    set_hook(move |f| c_store.lock().push(f.clone()));
    store
  });
  RECORDED.lock().clone()
}
