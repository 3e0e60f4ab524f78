//! # rxcore: push-based reactive streams
//!
//! Cold, cancellable observables with a small operator set and pluggable
//! schedulers.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(move |v| c_seen.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy stream, run once per subscription |
//! | [`Emitter`] | The guarded sink a producer pushes into |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Runs tasks for `subscribe_on` / `observe_on` |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] and a
//!   `Scheduler` impl for `futures::executor::ThreadPool`
//! - **`tokio-scheduler`**: a `Scheduler` impl for `tokio::runtime::Handle`
//!
//! [`Observable`]: observable::Observable
//! [`Emitter`]: emitter::Emitter
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler

pub mod disposable;
pub mod emitter;
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscription;
pub mod unhandled;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  #![doc = include_str!("../README.md")]
}
