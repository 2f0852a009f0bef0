//! Runtime values and deferred computation
//!
//! This module provides the pieces lesson code is written with on top of the
//! [`EventLoop`](crate::event_loop::EventLoop): values, promises and async
//! functions.

pub mod async_runtime;
pub mod promise;
pub mod value;

pub use async_runtime::{run_async, Async, Continuation};
pub use promise::{Promise, PromiseState, Resolvers, Settlement};
pub use value::Value;
