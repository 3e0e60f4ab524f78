//! Stream transformers.
//!
//! Each operator builds a new [`Observable`](crate::observable::Observable)
//! whose producer subscribes to the upstream with an adapter observer and
//! forwards transformed signals into its own emitter. The upstream
//! subscription is always tied to that emitter, so disposing downstream
//! cancels upstream and a terminal signal releases it.
//!
//! Operators that take a closure come in two flavours: a plain one that
//! cannot fail, and `*_with_err`, whose closure returns `Result` and turns an
//! `Err` into the stream's error signal.

pub mod filter;
pub mod flat_map;
pub mod map;
pub mod observe_on;
pub mod subscribe_on;
