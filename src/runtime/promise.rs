//! Promise Implementation
//!
//! A promise-like deferred value bound to an [`EventLoop`]. Settlement happens
//! at most once. Continuations (`then`/`catch`/`finally`, or an `await`
//! resumption) always run as microtasks, even when the promise was already
//! settled when the continuation was attached.

use super::value::Value;
use crate::error::{Error, Result};
use crate::event_loop::EventLoop;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The outcome a continuation receives
pub type Settlement = std::result::Result<Value, Error>;

type Reaction = Box<dyn FnOnce(&mut EventLoop, Settlement)>;

/// Promise state
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// Promise is pending - not yet settled
    Pending,
    /// Promise is fulfilled with a value
    Fulfilled(Value),
    /// Promise is rejected with a reason
    Rejected(Error),
}

struct PromiseInner {
    state: PromiseState,
    /// Reactions waiting for this promise to settle
    reactions: Vec<Reaction>,
    /// Whether a continuation has been attached (for unhandled rejection tracking)
    handled: bool,
}

/// Shared handle to a deferred value
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<PromiseInner>>,
}

/// The `resolve`/`reject` pair handed to an executor
///
/// Resolvers can be cloned and moved into timer callbacks; only the first
/// settlement counts.
#[derive(Clone)]
pub struct Resolvers {
    promise: Promise,
}

impl Promise {
    /// Create a pending promise together with its resolvers
    pub fn pending(event_loop: &mut EventLoop) -> (Promise, Resolvers) {
        event_loop.note_promise_created();
        let promise = Promise {
            inner: Rc::new(RefCell::new(PromiseInner {
                state: PromiseState::Pending,
                reactions: Vec::new(),
                handled: false,
            })),
        };
        let resolvers = Resolvers {
            promise: promise.clone(),
        };
        (promise, resolvers)
    }

    /// `new Promise(executor)`
    ///
    /// The executor runs synchronously. An error it returns rejects the
    /// promise, unless the executor already settled it.
    pub fn new<F>(event_loop: &mut EventLoop, executor: F) -> Promise
    where
        F: FnOnce(&mut EventLoop, Resolvers) -> Result<()>,
    {
        let (promise, resolvers) = Self::pending(event_loop);
        if let Err(err) = executor(event_loop, resolvers.clone()) {
            resolvers.reject(event_loop, err);
        }
        promise
    }

    /// `Promise.resolve(value)`
    pub fn resolved(event_loop: &mut EventLoop, value: impl Into<Value>) -> Promise {
        let (promise, resolvers) = Self::pending(event_loop);
        resolvers.resolve(event_loop, value);
        promise
    }

    /// `Promise.reject(error)`
    pub fn rejected(event_loop: &mut EventLoop, error: Error) -> Promise {
        let (promise, resolvers) = Self::pending(event_loop);
        resolvers.reject(event_loop, error);
        promise
    }

    /// Current state snapshot
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state.clone()
    }

    /// True once fulfilled or rejected
    pub fn is_settled(&self) -> bool {
        self.inner.borrow().state != PromiseState::Pending
    }

    /// True once any continuation has been attached
    pub fn is_handled(&self) -> bool {
        self.inner.borrow().handled
    }

    /// The rejection reason, if rejected
    pub fn rejection_reason(&self) -> Option<Error> {
        match &self.inner.borrow().state {
            PromiseState::Rejected(err) => Some(err.clone()),
            _ => None,
        }
    }

    fn settle(&self, event_loop: &mut EventLoop, settlement: Settlement) {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PromiseState::Pending {
                return; // Already settled
            }
            inner.state = match &settlement {
                Ok(value) => PromiseState::Fulfilled(value.clone()),
                Err(err) => PromiseState::Rejected(err.clone()),
            };
            std::mem::take(&mut inner.reactions)
        };
        event_loop.note_promise_settled();
        tracing::trace!(
            rejected = settlement.is_err(),
            reactions = reactions.len(),
            "promise settled"
        );

        if settlement.is_err() {
            event_loop.track_rejection(self.clone());
        }

        for reaction in reactions {
            let settlement = settlement.clone();
            event_loop.schedule_microtask(move |el| {
                reaction(el, settlement);
                Ok(())
            });
        }
    }

    /// Attach a raw continuation; it runs as a microtask after settlement
    pub(crate) fn subscribe(&self, event_loop: &mut EventLoop, reaction: Reaction) {
        let settled = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            inner.handled = true;
            match &inner.state {
                PromiseState::Pending => {
                    inner.reactions.push(reaction);
                    return;
                }
                PromiseState::Fulfilled(value) => Ok(value.clone()),
                PromiseState::Rejected(err) => Err(err.clone()),
            }
        };

        // Already settled - still deferred to a microtask
        event_loop.schedule_microtask(move |el| {
            reaction(el, settled);
            Ok(())
        });
    }

    /// Derive a promise settled with whatever `handler` makes of our settlement
    fn chain<F>(&self, event_loop: &mut EventLoop, handler: F) -> Promise
    where
        F: FnOnce(&mut EventLoop, Settlement) -> Settlement + 'static,
    {
        let (derived, resolvers) = Self::pending(event_loop);
        self.subscribe(
            event_loop,
            Box::new(move |el: &mut EventLoop, settled: Settlement| {
                let outcome = handler(el, settled);
                resolvers.settle(el, outcome);
            }),
        );
        derived
    }

    /// `.then(onFulfilled)`; a rejection passes through to the derived promise
    pub fn then<F>(&self, event_loop: &mut EventLoop, on_fulfilled: F) -> Promise
    where
        F: FnOnce(&mut EventLoop, Value) -> Result<Value> + 'static,
    {
        self.chain(event_loop, move |el, settled| match settled {
            Ok(value) => on_fulfilled(el, value),
            Err(err) => Err(err),
        })
    }

    /// `.catch(onRejected)`; a fulfillment passes through
    pub fn catch<F>(&self, event_loop: &mut EventLoop, on_rejected: F) -> Promise
    where
        F: FnOnce(&mut EventLoop, Error) -> Result<Value> + 'static,
    {
        self.chain(event_loop, move |el, settled| match settled {
            Ok(value) => Ok(value),
            Err(err) => on_rejected(el, err),
        })
    }

    /// `.then(onFulfilled, onRejected)`
    pub fn then_or_catch<F, R>(
        &self,
        event_loop: &mut EventLoop,
        on_fulfilled: F,
        on_rejected: R,
    ) -> Promise
    where
        F: FnOnce(&mut EventLoop, Value) -> Result<Value> + 'static,
        R: FnOnce(&mut EventLoop, Error) -> Result<Value> + 'static,
    {
        self.chain(event_loop, move |el, settled| match settled {
            Ok(value) => on_fulfilled(el, value),
            Err(err) => on_rejected(el, err),
        })
    }

    /// `.finally(onFinally)`
    ///
    /// The original settlement passes through unless `on_finally` fails.
    pub fn finally<F>(&self, event_loop: &mut EventLoop, on_finally: F) -> Promise
    where
        F: FnOnce(&mut EventLoop) -> Result<()> + 'static,
    {
        self.chain(event_loop, move |el, settled| {
            on_finally(el)?;
            settled
        })
    }

    /// `Promise.all` - fulfills with every value in input order, rejects on first rejection
    pub fn all(event_loop: &mut EventLoop, promises: Vec<Promise>) -> Promise {
        let (result, resolvers) = Self::pending(event_loop);
        let count = promises.len();

        if count == 0 {
            resolvers.resolve(event_loop, Value::Array(vec![]));
            return result;
        }

        let values = Rc::new(RefCell::new(vec![Value::Undefined; count]));
        let remaining = Rc::new(RefCell::new(count));

        for (i, promise) in promises.iter().enumerate() {
            let resolvers = resolvers.clone();
            let values = values.clone();
            let remaining = remaining.clone();
            promise.subscribe(
                event_loop,
                Box::new(move |el: &mut EventLoop, settled: Settlement| match settled {
                    Ok(value) => {
                        values.borrow_mut()[i] = value;
                        let mut rem = remaining.borrow_mut();
                        *rem -= 1;
                        if *rem == 0 {
                            let all = values.borrow().clone();
                            resolvers.resolve(el, Value::Array(all));
                        }
                    }
                    Err(err) => resolvers.reject(el, err),
                }),
            );
        }

        result
    }

    /// `Promise.race` - settles like the first input to settle
    pub fn race(event_loop: &mut EventLoop, promises: Vec<Promise>) -> Promise {
        let (result, resolvers) = Self::pending(event_loop);
        for promise in &promises {
            let resolvers = resolvers.clone();
            promise.subscribe(
                event_loop,
                Box::new(move |el: &mut EventLoop, settled: Settlement| resolvers.settle(el, settled)),
            );
        }
        result
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .field("handled", &inner.handled)
            .finish()
    }
}

impl Resolvers {
    /// Fulfill the promise with a value
    pub fn resolve(&self, event_loop: &mut EventLoop, value: impl Into<Value>) {
        self.promise.settle(event_loop, Ok(value.into()));
    }

    /// Reject the promise with a reason
    pub fn reject(&self, event_loop: &mut EventLoop, error: Error) {
        self.promise.settle(event_loop, Err(error));
    }

    /// Settle with an already-computed outcome
    pub fn settle(&self, event_loop: &mut EventLoop, settlement: Settlement) {
        self.promise.settle(event_loop, settlement);
    }

    /// Settle the same way `other` eventually does
    pub fn follow(&self, event_loop: &mut EventLoop, other: &Promise) {
        let resolvers = self.clone();
        other.subscribe(
            event_loop,
            Box::new(move |el: &mut EventLoop, settled: Settlement| resolvers.settle(el, settled)),
        );
    }

    /// The promise these resolvers settle
    pub fn promise(&self) -> &Promise {
        &self.promise
    }
}
