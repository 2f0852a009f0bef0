//! Lesson scenarios
//!
//! The snippets of the error-handling and async lesson, each packaged as an
//! entry script for a fresh [`EventLoop`]. Running one reproduces the console
//! output the lesson shows.

mod scripts;

use crate::config::LoopConfig;
use crate::error::{Error, Result};
use crate::event_loop::{EventLoop, Reporter, RunResult, Transcript};

/// A runnable lesson snippet
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description
    pub summary: &'static str,
    entry: fn(&mut EventLoop) -> Result<()>,
}

impl Scenario {
    /// Run the scenario on a fresh loop until it is drained
    pub fn run(&self, config: LoopConfig, reporter: impl Reporter + 'static) -> Result<RunResult> {
        tracing::info!(scenario = self.name, "running scenario");
        let mut event_loop = EventLoop::with_config(config, reporter);
        event_loop.set_entry(self.entry);
        event_loop.drain()
    }

    /// Run with the default config and capture everything printed
    pub fn record(&self) -> (Transcript, Result<RunResult>) {
        let transcript = Transcript::new();
        let outcome = self.run(LoopConfig::default(), transcript.clone());
        (transcript, outcome)
    }
}

/// Every scenario, in lesson order
pub static SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "coffee",
        summary: "setTimeout defers work until the synchronous code is done",
        entry: scripts::coffee,
    },
    Scenario {
        name: "two-timers",
        summary: "zero-delay timers still wait for the main script, and keep their order",
        entry: scripts::two_timers,
    },
    Scenario {
        name: "microtask-vs-macrotask",
        summary: "a resolved promise callback beats a zero-delay timer",
        entry: scripts::microtask_vs_macrotask,
    },
    Scenario {
        name: "mixed-delays",
        summary: "timers fire by delay, not by registration order",
        entry: scripts::mixed_delays,
    },
    Scenario {
        name: "try-catch",
        summary: "catching a ReferenceError keeps the program running",
        entry: scripts::try_catch,
    },
    Scenario {
        name: "throw-custom",
        summary: "throwing your own errors for invalid input",
        entry: scripts::throw_custom,
    },
    Scenario {
        name: "finally",
        summary: "finally runs whether or not the try block failed",
        entry: scripts::finally,
    },
    Scenario {
        name: "promise-chain",
        summary: "then/catch/finally chains, with a rejection skipping ahead to catch",
        entry: scripts::promise_chain,
    },
    Scenario {
        name: "async-await",
        summary: "await suspends the async function, not the caller",
        entry: scripts::async_await,
    },
    Scenario {
        name: "async-error",
        summary: "try/catch around await handles a rejected promise",
        entry: scripts::async_error,
    },
    Scenario {
        name: "isolated-failure",
        summary: "an error in one timer callback does not stop the others",
        entry: scripts::isolated_failure,
    },
    Scenario {
        name: "unhandled-rejection",
        summary: "a rejection without catch is reported after everything else ran",
        entry: scripts::unhandled_rejection,
    },
    Scenario {
        name: "uncaught",
        summary: "an uncaught error in the main script stops everything",
        entry: scripts::uncaught,
    },
];

/// Look a scenario up by name
pub fn find(name: &str) -> Result<&'static Scenario> {
    SCENARIOS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::UnknownScenario(name.to_string()))
}
