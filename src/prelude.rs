//! Prelude module for convenient imports

// Cancellation
pub use crate::disposable::{self, CompositeDisposable, Disposable};
// Producer side
pub use crate::emitter::{Emitter, EmitterState};
pub use crate::error::{RxError, ScheduleError};
// Observable and its factories
pub use crate::observable::{self, Observable};
pub use crate::observer::{FnObserver, Observer};
// Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
pub use crate::scheduler::{ImmediateScheduler, IoScheduler, ManualScheduler, Scheduler, Task};
pub use crate::subscription::{Subscription, SubscriptionGuard};
pub use crate::unhandled::{FailureSource, UnhandledFailure};
