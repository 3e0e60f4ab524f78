//! The default error type carried by observables.
//!
//! Every observable is generic over its error type, but most pipelines only
//! need "something went wrong, here is why". [`RxError`] fills that role: it
//! is cheap to clone (so it can be replayed by [`Observable::throw`]) and can
//! wrap any `std::error::Error`.
//!
//! [`Observable::throw`]: crate::observable::Observable::throw

use std::{error::Error as StdError, io, sync::Arc};

use thiserror::Error;

/// Failure delivered through `error` when no more specific type is chosen.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RxError {
  /// A plain message, usually produced by a producer or an operator closure.
  #[error("{0}")]
  Message(String),

  /// An arbitrary error raised by user code.
  #[error(transparent)]
  Source(Arc<dyn StdError + Send + Sync>),

  /// A scheduler refused work an operator handed to it.
  #[error(transparent)]
  Schedule(#[from] ScheduleError),
}

/// Why a [`Scheduler`](crate::scheduler::Scheduler) did not accept a task.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ScheduleError {
  #[error("scheduler is shut down")]
  Shutdown,

  #[error("failed to start a worker thread: {0}")]
  Spawn(Arc<io::Error>),
}

impl RxError {
  /// Builds an error from a message.
  ///
  /// ```
  /// use rxcore::RxError;
  ///
  /// let err = RxError::msg("bad");
  /// assert_eq!(err.to_string(), "bad");
  /// ```
  pub fn msg(message: impl Into<String>) -> Self { RxError::Message(message.into()) }

  /// Wraps an existing error value.
  pub fn from_error<E>(err: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    RxError::Source(Arc::new(err))
  }

  /// Returns a short stable label (snake_case) for use in logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      RxError::Message(_) => "rx_message",
      RxError::Source(_) => "rx_source",
      RxError::Schedule(_) => "rx_schedule",
    }
  }
}

impl From<&str> for RxError {
  fn from(message: &str) -> Self { RxError::msg(message) }
}

impl From<String> for RxError {
  fn from(message: String) -> Self { RxError::Message(message) }
}
