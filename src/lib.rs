//! Tickloop: a deterministic event-loop simulator
//!
//! Tickloop reproduces the execution order of a single-threaded, event-loop
//! based runtime: synchronous code first, then every microtask, then one
//! macrotask at a time with the microtask queue drained in between. Timers run
//! on a virtual clock, so lessons about `setTimeout`, Promises and
//! `async`/`await` replay instantly and identically every time.
//!
//! # Quick Start
//!
//! ```
//! use tickloop::{EventLoop, Promise, Transcript, Value};
//!
//! let transcript = Transcript::new();
//! let mut el = EventLoop::with_reporter(transcript.clone());
//!
//! el.set_entry(|el| {
//!     el.log("Start");
//!     el.schedule_macrotask(|el| { el.log("timeout"); Ok(()) }, 0);
//!     Promise::resolved(el, "promise").then(el, |el, v| {
//!         el.log(v.to_string());
//!         Ok(Value::Undefined)
//!     });
//!     el.log("End");
//!     Ok(())
//! });
//! el.drain()?;
//!
//! assert_eq!(transcript.lines(), ["Start", "End", "promise", "timeout"]);
//! # Ok::<(), tickloop::Error>(())
//! ```
//!
//! # Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`event_loop`] | [`EventLoop`], queues, [`Reporter`] sinks |
//! | [`runtime`] | [`Value`], [`Promise`], async functions |
//! | [`lessons`] | the lesson snippets as runnable scenarios |
//! | [`config`] | [`LoopConfig`] |

pub mod config;
pub mod event_loop;
pub mod lessons;
pub mod runtime;

mod error;

pub use config::LoopConfig;
pub use error::{Error, ErrorKind, ResourceLimitKind, Result};
pub use event_loop::{
    Entry, EventLoop, EventLoopStats, Reporter, RunResult, StdoutReporter, TaskKind, TimerHandle,
    Transcript,
};
pub use runtime::{run_async, Async, Promise, PromiseState, Resolvers, Settlement, Value};

/// Tickloop version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
