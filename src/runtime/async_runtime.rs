//! Async Runtime Support
//!
//! `async`/`await` without coroutines. An async body runs synchronously until
//! its first await, then hands back the awaited promise and a continuation.
//! The continuation is registered on that promise and resumes as a microtask
//! with the awaited settlement, so `try { await p } catch (e) { ... }` is just
//! a `match` on the [`Settlement`] it receives.

use super::promise::{Promise, Resolvers, Settlement};
use super::value::Value;
use crate::error::Result;
use crate::event_loop::EventLoop;

/// Rest of an async function after an `await`
pub type Continuation = Box<dyn FnOnce(&mut EventLoop, Settlement) -> Result<Async>>;

/// What an async body does next
pub enum Async {
    /// `return value` - fulfills the async function's promise
    Return(Value),
    /// `await promise`, then continue with the settlement
    Await(Promise, Continuation),
}

impl Async {
    /// `return value`
    pub fn ret(value: impl Into<Value>) -> Result<Async> {
        Ok(Async::Return(value.into()))
    }

    /// `await promise`, resuming in `continuation`
    pub fn await_then<F>(promise: Promise, continuation: F) -> Result<Async>
    where
        F: FnOnce(&mut EventLoop, Settlement) -> Result<Async> + 'static,
    {
        Ok(Async::Await(promise, Box::new(continuation)))
    }

    /// `await value` on a plain value; still yields one microtask
    pub fn await_value<F>(
        event_loop: &mut EventLoop,
        value: impl Into<Value>,
        continuation: F,
    ) -> Result<Async>
    where
        F: FnOnce(&mut EventLoop, Settlement) -> Result<Async> + 'static,
    {
        let promise = Promise::resolved(event_loop, value);
        Self::await_then(promise, continuation)
    }
}

/// Call an async function
///
/// `body` runs right away, up to its first await. The returned promise
/// fulfills with the eventual return value and rejects with any error
/// returned along the way.
pub fn run_async<F>(event_loop: &mut EventLoop, body: F) -> Promise
where
    F: FnOnce(&mut EventLoop) -> Result<Async>,
{
    let (promise, resolvers) = Promise::pending(event_loop);
    let first = body(event_loop);
    step(event_loop, first, resolvers);
    promise
}

fn step(event_loop: &mut EventLoop, outcome: Result<Async>, resolvers: Resolvers) {
    match outcome {
        Ok(Async::Return(value)) => resolvers.resolve(event_loop, value),
        Err(err) => resolvers.reject(event_loop, err),
        Ok(Async::Await(awaited, continuation)) => {
            tracing::trace!("async function suspended");
            awaited.subscribe(
                event_loop,
                Box::new(move |el: &mut EventLoop, settled: Settlement| {
                    let next = continuation(el, settled);
                    step(el, next, resolvers);
                }),
            );
        }
    }
}
