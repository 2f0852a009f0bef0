//! Event Loop Implementation
//!
//! A deterministic, single-threaded event loop with a FIFO microtask queue
//! and a delay-ordered macrotask queue. Delays run on a virtual clock, so a
//! 2000ms timer fires instantly but still after a 1000ms one.
//!
//! The driver ([`EventLoop::drain`]) follows the usual algorithm:
//!   1. Run the synchronous entry action
//!   2. Drain every microtask, including ones queued while draining
//!   3. Run the single earliest macrotask, then go back to step 2
//!   4. Stop when both queues are empty
//!
//! A failing callback is reported and the loop moves on; only the entry
//! action can abort a drain.

pub mod reporter;

use crate::config::LoopConfig;
use crate::error::{Error, Result};
use crate::runtime::promise::Promise;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

pub use reporter::{Entry, Reporter, StdoutReporter, Transcript};

/// A deferred action; it gets the loop back so it can schedule more work
pub type Callback = Box<dyn FnOnce(&mut EventLoop) -> Result<()>>;

/// Which queue a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Promise reactions, `queueMicrotask`, `await` resumptions
    Microtask,
    /// Timers (`setTimeout`)
    Macrotask,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Microtask => write!(f, "microtask"),
            TaskKind::Macrotask => write!(f, "macrotask"),
        }
    }
}

/// A queued unit of work, run exactly once
pub struct Task {
    /// Scheduled-order, unique per loop and increasing with registration
    pub order: u64,
    /// Queue the task was registered in
    pub kind: TaskKind,
    /// Clamped delay in milliseconds (always 0 for microtasks)
    pub delay: u64,
    callback: Callback,
}

impl Task {
    /// Execute the task, consuming it
    pub fn run(self, event_loop: &mut EventLoop) -> Result<()> {
        (self.callback)(event_loop)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("order", &self.order)
            .field("kind", &self.kind)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Opaque cancellation handle returned by [`EventLoop::schedule_macrotask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Macrotask ordering key: virtual due time, then registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimerKey {
    due: u64,
    order: u64,
}

/// Result of one [`EventLoop::drain`]
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Total number of microtasks that were dequeued and processed
    pub microtasks_processed: usize,
    /// Total number of macrotasks that were dequeued and processed
    pub macrotasks_processed: usize,
    /// Number of loop iterations (each iteration = one macrotask + the microtasks after it)
    pub iterations: usize,
    /// The virtual time when the event loop finished
    pub final_time: u64,
    /// Errors reported to the sink during the drain, in order
    pub errors: Vec<Error>,
    /// Rejections nobody handled
    pub unhandled_rejections: usize,
}

impl RunResult {
    /// True when nothing was reported
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.unhandled_rejections == 0
    }
}

/// Runtime statistics for the event loop
#[derive(Clone, Debug, Default)]
pub struct EventLoopStats {
    /// Total microtasks processed
    pub total_microtasks: u64,
    /// Total macrotasks processed
    pub total_macrotasks: u64,
    /// Maximum microtasks drained in a single pass
    pub max_microtasks_per_drain: u64,
    /// Timers removed through `cancel`
    pub timers_cancelled: u64,
    /// Errors handed to the reporter
    pub errors_reported: u64,
    /// Total promises created
    pub total_promises_created: u64,
    /// Total promises settled (fulfilled or rejected)
    pub total_promises_settled: u64,
}

/// The event loop owns both queues, the virtual clock and the console
pub struct EventLoop {
    /// Microtask queue (high priority - runs between macrotasks)
    microtask_queue: VecDeque<Task>,
    /// Macrotask queue ordered by (due, order)
    macrotask_queue: BTreeMap<TimerKey, Task>,
    /// Live timers, for cancellation
    timers: FxHashMap<TimerHandle, TimerKey>,
    /// Current virtual time in milliseconds
    virtual_time: u64,
    /// Next scheduled-order value
    next_order: u64,
    /// Main script, run by the first `drain`
    entry: Option<Callback>,
    reporter: Box<dyn Reporter>,
    config: LoopConfig,
    /// Promises that rejected; checked for handlers after the drain
    rejected_promises: Vec<Promise>,
    /// Errors reported since the last drain finished
    reported: Vec<Error>,
    stats: EventLoopStats,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("microtasks", &self.microtask_queue.len())
            .field("macrotasks", &self.macrotask_queue.len())
            .field("virtual_time", &self.virtual_time)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EventLoop {
    /// Create an event loop printing to stdout with the default config
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default(), StdoutReporter)
    }

    /// Create an event loop printing to `reporter`
    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self::with_config(LoopConfig::default(), reporter)
    }

    /// Create an event loop with an explicit config and reporter
    pub fn with_config(config: LoopConfig, reporter: impl Reporter + 'static) -> Self {
        Self {
            microtask_queue: VecDeque::new(),
            macrotask_queue: BTreeMap::new(),
            timers: FxHashMap::default(),
            virtual_time: 0,
            next_order: 0,
            entry: None,
            reporter: Box::new(reporter),
            config,
            rejected_promises: Vec::new(),
            reported: Vec::new(),
            stats: EventLoopStats::default(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Get current virtual time
    pub fn current_time(&self) -> u64 {
        self.virtual_time
    }

    /// `console.log`
    pub fn log(&mut self, line: impl AsRef<str>) {
        self.reporter.report(line.as_ref());
    }

    /// Hand an unhandled error to the reporter
    pub fn report_error(&mut self, error: Error) {
        tracing::warn!(error = %error, time = self.virtual_time, "unhandled error");
        self.reporter.report_error(&error);
        self.stats.errors_reported += 1;
        self.reported.push(error);
    }

    fn next_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Execute `action` right now, in the caller's context
    ///
    /// An error escaping the action is uncaught: it is reported and returned
    /// wrapped in [`Error::Uncaught`].
    pub fn run_synchronous<F>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce(&mut EventLoop) -> Result<()>,
    {
        action(self).map_err(|err| {
            let uncaught = Error::Uncaught(Box::new(err));
            self.report_error(uncaught.clone());
            uncaught
        })
    }

    /// Install the main script; the next `drain` runs it first
    ///
    /// If the script fails, the loop terminates: work it already queued is
    /// discarded rather than run.
    pub fn set_entry<F>(&mut self, action: F)
    where
        F: FnOnce(&mut EventLoop) -> Result<()> + 'static,
    {
        self.entry = Some(Box::new(action));
    }

    /// Append a microtask (`queueMicrotask`)
    pub fn schedule_microtask<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut EventLoop) -> Result<()> + 'static,
    {
        let order = self.next_order();
        tracing::trace!(order, "microtask scheduled");
        self.microtask_queue.push_back(Task {
            order,
            kind: TaskKind::Microtask,
            delay: 0,
            callback: Box::new(callback),
        });
    }

    /// Schedule a timer (`setTimeout`)
    ///
    /// Negative delays are clamped to 0. The delay counts from the current
    /// virtual time.
    pub fn schedule_macrotask<F>(&mut self, callback: F, delay: i64) -> TimerHandle
    where
        F: FnOnce(&mut EventLoop) -> Result<()> + 'static,
    {
        let delay = delay.max(0) as u64;
        let order = self.next_order();
        let key = TimerKey {
            due: self.virtual_time.saturating_add(delay),
            order,
        };
        tracing::trace!(order, delay, due = key.due, "macrotask scheduled");

        self.macrotask_queue.insert(
            key,
            Task {
                order,
                kind: TaskKind::Macrotask,
                delay,
                callback: Box::new(callback),
            },
        );
        let handle = TimerHandle(order);
        self.timers.insert(handle, key);
        handle
    }

    /// Cancel a timer that has not fired yet
    ///
    /// Returns false, and does nothing, for timers that already ran or were
    /// already cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(key) = self.timers.remove(&handle) else {
            return false;
        };
        self.macrotask_queue.remove(&key);
        self.stats.timers_cancelled += 1;
        tracing::debug!(order = key.order, "timer cancelled");
        true
    }

    /// Check if there are pending microtasks
    pub fn has_pending_microtasks(&self) -> bool {
        !self.microtask_queue.is_empty()
    }

    /// Check if there are pending macrotasks
    pub fn has_pending_macrotasks(&self) -> bool {
        !self.macrotask_queue.is_empty()
    }

    /// Check if the event loop has any pending work
    pub fn has_pending_work(&self) -> bool {
        self.has_pending_microtasks() || self.has_pending_macrotasks()
    }

    /// Number of queued microtasks
    pub fn pending_microtasks(&self) -> usize {
        self.microtask_queue.len()
    }

    /// Number of queued (not cancelled) macrotasks
    pub fn pending_macrotasks(&self) -> usize {
        self.macrotask_queue.len()
    }

    /// Run the loop until both queues are empty
    ///
    /// Returns `Err` only when the entry action throws or a drain pass
    /// exceeds the configured microtask budget; either way the queues are
    /// discarded. Errors from queued callbacks are reported and the drain
    /// carries on.
    pub fn drain(&mut self) -> Result<RunResult> {
        let mut result = RunResult::default();
        tracing::debug!(
            microtasks = self.microtask_queue.len(),
            macrotasks = self.macrotask_queue.len(),
            "drain started"
        );

        if let Some(entry) = self.entry.take() {
            if let Err(err) = self.run_synchronous(entry) {
                self.clear();
                self.reported.clear();
                return Err(err);
            }
        }

        loop {
            match self.run_microtasks() {
                Ok(count) => result.microtasks_processed += count,
                Err(err) => {
                    self.report_error(err.clone());
                    self.clear();
                    self.reported.clear();
                    return Err(err);
                }
            }

            let Some(task) = self.pop_macrotask() else {
                break;
            };
            result.macrotasks_processed += 1;
            result.iterations += 1;
            self.stats.total_macrotasks += 1;
            self.run_task(task);
        }

        result.unhandled_rejections = self.report_unhandled_rejections();
        result.final_time = self.virtual_time;
        result.errors = std::mem::take(&mut self.reported);
        tracing::debug!(
            microtasks = result.microtasks_processed,
            macrotasks = result.macrotasks_processed,
            final_time = result.final_time,
            "drain finished"
        );
        Ok(result)
    }

    /// Drain the microtask queue completely
    ///
    /// Microtasks queued by running microtasks are part of the same pass.
    /// Returns the number of microtasks run.
    pub fn run_microtasks(&mut self) -> Result<usize> {
        let budget = self.config.microtask_budget;
        let mut count: usize = 0;

        while let Some(task) = self.microtask_queue.pop_front() {
            if let Some(limit) = budget.filter(|&limit| count >= limit) {
                self.microtask_queue.push_front(task);
                self.record_microtask_pass(count);
                return Err(Error::microtask_budget_exceeded(limit));
            }
            self.run_task(task);
            count += 1;
        }

        self.record_microtask_pass(count);
        Ok(count)
    }

    fn record_microtask_pass(&mut self, count: usize) {
        self.stats.total_microtasks += count as u64;
        if (count as u64) > self.stats.max_microtasks_per_drain {
            self.stats.max_microtasks_per_drain = count as u64;
        }
    }

    /// Remove the earliest macrotask and advance the clock to its due time
    fn pop_macrotask(&mut self) -> Option<Task> {
        let (key, task) = self.macrotask_queue.pop_first()?;
        self.timers.remove(&TimerHandle(key.order));
        self.virtual_time = self.virtual_time.max(key.due);
        Some(task)
    }

    fn run_task(&mut self, task: Task) {
        tracing::trace!(kind = %task.kind, order = task.order, time = self.virtual_time, "running task");
        if let Err(err) = task.run(self) {
            self.report_error(Error::Uncaught(Box::new(err)));
        }
    }

    /// Remember a rejected promise so it can be checked for handlers later
    pub(crate) fn track_rejection(&mut self, promise: Promise) {
        self.rejected_promises.push(promise);
    }

    pub(crate) fn note_promise_created(&mut self) {
        self.stats.total_promises_created += 1;
    }

    pub(crate) fn note_promise_settled(&mut self) {
        self.stats.total_promises_settled += 1;
    }

    fn report_unhandled_rejections(&mut self) -> usize {
        let rejected = std::mem::take(&mut self.rejected_promises);
        let mut count = 0;
        for promise in rejected {
            if promise.is_handled() {
                continue;
            }
            if let Some(reason) = promise.rejection_reason() {
                count += 1;
                if self.config.report_unhandled_rejections {
                    self.report_error(Error::UnhandledRejection(Box::new(reason)));
                }
            }
        }
        count
    }

    /// Discard all pending work (teardown without running anything)
    pub fn clear(&mut self) {
        self.microtask_queue.clear();
        self.macrotask_queue.clear();
        self.timers.clear();
        self.entry = None;
        self.rejected_promises.clear();
    }

    /// Get a snapshot of the current event loop statistics.
    pub fn stats(&self) -> EventLoopStats {
        self.stats.clone()
    }

    /// Reset all event loop statistics to zero.
    pub fn reset_stats(&mut self) {
        self.stats = EventLoopStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_loop() -> (EventLoop, Transcript) {
        let transcript = Transcript::new();
        (EventLoop::with_reporter(transcript.clone()), transcript)
    }

    fn log_later(el: &mut EventLoop, line: &'static str, delay: i64) -> TimerHandle {
        el.schedule_macrotask(
            move |el| {
                el.log(line);
                Ok(())
            },
            delay,
        )
    }

    fn log_soon(el: &mut EventLoop, line: &'static str) {
        el.schedule_microtask(move |el| {
            el.log(line);
            Ok(())
        });
    }

    #[test]
    fn test_new_event_loop() {
        let el = EventLoop::new();
        assert!(!el.has_pending_work());
        assert_eq!(el.current_time(), 0);
    }

    #[test]
    fn test_drain_empty() {
        let (mut el, transcript) = recording_loop();
        let result = el.drain().unwrap();
        assert_eq!(result.microtasks_processed, 0);
        assert_eq!(result.macrotasks_processed, 0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_time, 0);
        assert!(result.is_clean());
        assert!(transcript.entries().is_empty());
    }

    #[test]
    fn test_equal_delays_fire_in_registration_order() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "a", 10);
        log_later(&mut el, "b", 10);
        log_later(&mut el, "c", 10);

        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_microtasks_before_earlier_macrotask() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "timer", 0);
        log_soon(&mut el, "micro 1");
        log_soon(&mut el, "micro 2");

        let result = el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["micro 1", "micro 2", "timer"]);
        assert_eq!(result.microtasks_processed, 2);
        assert_eq!(result.macrotasks_processed, 1);
    }

    #[test]
    fn test_nested_microtasks_run_in_same_pass() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "timer", 0);
        el.schedule_microtask(|el| {
            el.log("outer");
            el.schedule_microtask(|el| {
                el.log("inner");
                Ok(())
            });
            Ok(())
        });

        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["outer", "inner", "timer"]);
    }

    #[test]
    fn test_microtasks_drain_between_macrotasks() {
        let (mut el, transcript) = recording_loop();
        el.schedule_macrotask(
            |el| {
                el.log("timer 1");
                el.schedule_microtask(|el| {
                    el.log("micro from timer 1");
                    Ok(())
                });
                Ok(())
            },
            0,
        );
        log_later(&mut el, "timer 2", 0);

        let result = el.drain().unwrap();
        assert_eq!(
            transcript.lines(),
            vec!["timer 1", "micro from timer 1", "timer 2"]
        );
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_shorter_delay_fires_first() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "2000", 2000);
        log_later(&mut el, "1000", 1000);

        let result = el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["1000", "2000"]);
        assert_eq!(result.final_time, 2000);
    }

    #[test]
    fn test_negative_delay_is_clamped() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "zero", 0);
        log_later(&mut el, "negative", -50);

        let result = el.drain().unwrap();
        // same effective delay, so registration order decides
        assert_eq!(transcript.lines(), vec!["zero", "negative"]);
        assert_eq!(result.final_time, 0);
    }

    #[test]
    fn test_delay_counts_from_current_time() {
        let (mut el, transcript) = recording_loop();
        el.schedule_macrotask(
            |el| {
                el.log("at 1000");
                el.schedule_macrotask(
                    |el| {
                        el.log("at 1500");
                        Ok(())
                    },
                    500,
                );
                Ok(())
            },
            1000,
        );
        log_later(&mut el, "at 1200", 1200);

        let result = el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["at 1000", "at 1200", "at 1500"]);
        assert_eq!(result.final_time, 1500);
    }

    #[test]
    fn test_cancel_twice_is_safe() {
        let (mut el, transcript) = recording_loop();
        let handle = log_later(&mut el, "cancelled", 0);
        log_later(&mut el, "kept", 0);

        assert!(el.cancel(handle));
        assert!(!el.cancel(handle));
        assert_eq!(el.pending_macrotasks(), 1);

        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["kept"]);
        assert_eq!(el.stats().timers_cancelled, 1);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let (mut el, transcript) = recording_loop();
        let handle = log_later(&mut el, "fired", 5);
        el.drain().unwrap();

        assert!(!el.cancel(handle));
        assert_eq!(transcript.lines(), vec!["fired"]);
    }

    #[test]
    fn test_cancel_from_another_callback() {
        let (mut el, transcript) = recording_loop();
        let late = log_later(&mut el, "never", 100);
        el.schedule_macrotask(
            move |el| {
                el.cancel(late);
                el.log("cancelled the late timer");
                Ok(())
            },
            10,
        );

        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["cancelled the late timer"]);
    }

    #[test]
    fn test_failing_callback_does_not_stop_drain() {
        let (mut el, transcript) = recording_loop();
        el.schedule_macrotask(|_| Err(Error::type_error("boom")), 0);
        log_later(&mut el, "still runs", 0);
        el.schedule_microtask(|_| Err(Error::new("micro boom")));
        log_soon(&mut el, "sibling microtask");

        let result = el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["sibling microtask", "still runs"]);
        assert_eq!(
            transcript.errors(),
            vec!["Uncaught Error: micro boom", "Uncaught TypeError: boom"]
        );
        assert_eq!(result.errors.len(), 2);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_entry_runs_before_queued_work() {
        let (mut el, transcript) = recording_loop();
        el.set_entry(|el| {
            el.log("Start");
            el.schedule_macrotask(
                |el| {
                    el.log("timer");
                    Ok(())
                },
                0,
            );
            el.schedule_microtask(|el| {
                el.log("micro");
                Ok(())
            });
            el.log("End");
            Ok(())
        });

        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["Start", "End", "micro", "timer"]);
    }

    #[test]
    fn test_entry_error_discards_queues() {
        let (mut el, transcript) = recording_loop();
        el.set_entry(|el| {
            el.log("before throw");
            el.schedule_macrotask(
                |el| {
                    el.log("never");
                    Ok(())
                },
                0,
            );
            Err(Error::reference_error("brew is not defined"))
        });

        let err = el.drain().unwrap_err();
        assert_eq!(
            err,
            Error::Uncaught(Box::new(Error::reference_error("brew is not defined")))
        );
        assert!(!el.has_pending_work());
        assert_eq!(transcript.lines(), vec!["before throw"]);
        assert_eq!(
            transcript.errors(),
            vec!["Uncaught ReferenceError: brew is not defined"]
        );
    }

    #[test]
    fn test_run_synchronous_reports_and_returns() {
        let (mut el, transcript) = recording_loop();
        let err = el
            .run_synchronous(|_| Err(Error::range_error("too hot")))
            .unwrap_err();
        assert!(matches!(err, Error::Uncaught(_)));
        assert_eq!(transcript.errors(), vec!["Uncaught RangeError: too hot"]);

        // the loop stays usable
        el.run_synchronous(|el| {
            el.log("ok");
            Ok(())
        })
        .unwrap();
        assert_eq!(transcript.lines(), vec!["ok"]);
    }

    #[test]
    fn test_entry_runs_only_once() {
        let (mut el, transcript) = recording_loop();
        el.set_entry(|el| {
            el.log("main");
            Ok(())
        });
        el.drain().unwrap();
        el.drain().unwrap();
        assert_eq!(transcript.lines(), vec!["main"]);
    }

    #[test]
    fn test_microtask_budget_stops_runaway_chain() {
        fn forever(el: &mut EventLoop) -> Result<()> {
            el.schedule_microtask(forever);
            Ok(())
        }

        let transcript = Transcript::new();
        let config = LoopConfig::default().with_microtask_budget(50);
        let mut el = EventLoop::with_config(config, transcript.clone());
        el.schedule_microtask(forever);
        log_later(&mut el, "starved", 0);

        let err = el.drain().unwrap_err();
        assert!(matches!(err, Error::ResourceLimit { .. }));
        assert!(!el.has_pending_work());
        assert!(transcript.lines().is_empty());
        assert_eq!(transcript.errors().len(), 1);
    }

    #[test]
    fn test_budget_stop_still_counts_the_pass() {
        let config = LoopConfig::default().with_microtask_budget(3);
        let mut el = EventLoop::with_config(config, Transcript::new());
        for _ in 0..5 {
            el.schedule_microtask(|_| Ok(()));
        }

        assert!(el.drain().is_err());
        let stats = el.stats();
        assert_eq!(stats.total_microtasks, 3);
        assert_eq!(stats.max_microtasks_per_drain, 3);
    }

    #[test]
    fn test_default_config_has_no_budget() {
        let mut el = EventLoop::with_reporter(Transcript::new());
        for _ in 0..20_000 {
            el.schedule_microtask(|_| Ok(()));
        }

        let result = el.drain().unwrap();
        assert_eq!(result.microtasks_processed, 20_000);
    }

    #[test]
    fn test_budget_is_per_pass() {
        let config = LoopConfig::default().with_microtask_budget(2);
        let mut el = EventLoop::with_config(config, Transcript::new());
        for _ in 0..3 {
            el.schedule_macrotask(
                |el| {
                    el.schedule_microtask(|_| Ok(()));
                    el.schedule_microtask(|_| Ok(()));
                    Ok(())
                },
                0,
            );
        }

        let result = el.drain().unwrap();
        assert_eq!(result.microtasks_processed, 6);
        assert_eq!(el.stats().max_microtasks_per_drain, 2);
    }

    #[test]
    fn test_stats_tracking() {
        let mut el = EventLoop::with_reporter(Transcript::new());
        el.schedule_microtask(|_| Ok(()));
        el.schedule_macrotask(|_| Ok(()), 0);
        el.schedule_macrotask(|_| Err(Error::new("x")), 0);
        el.drain().unwrap();

        let stats = el.stats();
        assert_eq!(stats.total_microtasks, 1);
        assert_eq!(stats.total_macrotasks, 2);
        assert_eq!(stats.errors_reported, 1);

        el.reset_stats();
        assert_eq!(el.stats().total_macrotasks, 0);
    }

    #[test]
    fn test_clear_discards_work() {
        let (mut el, transcript) = recording_loop();
        log_later(&mut el, "x", 0);
        log_soon(&mut el, "y");
        el.clear();
        assert!(!el.has_pending_work());
        el.drain().unwrap();
        assert!(transcript.entries().is_empty());
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Microtask.to_string(), "microtask");
        assert_eq!(TaskKind::Macrotask.to_string(), "macrotask");
    }
}
