//! Output and error sinks for the event loop
//!
//! Everything a callback prints goes through a [`Reporter`]; the loop itself
//! uses the same sink to report callback failures and unhandled rejections.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// The console the loop prints to
pub trait Reporter {
    /// Print one line of regular output (`console.log`)
    fn report(&mut self, line: &str);

    /// Report an error that no user code handled
    fn report_error(&mut self, error: &Error);
}

/// Writes lines to stdout and errors to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&mut self, line: &str) {
        println!("{}", line);
    }

    fn report_error(&mut self, error: &Error) {
        eprintln!("{}", error);
    }
}

/// One recorded console event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stream", content = "text", rename_all = "snake_case")]
pub enum Entry {
    /// Regular output
    Line(String),
    /// A reported error, rendered with `Display`
    Error(String),
}

/// A shared, recording reporter
///
/// Clones share the same buffer, so a test can hand one clone to the loop and
/// keep another to inspect what was printed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in the order they were reported
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }

    /// Only the regular output lines
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Entry::Line(text) => Some(text.clone()),
                Entry::Error(_) => None,
            })
            .collect()
    }

    /// Only the reported errors
    pub fn errors(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Entry::Error(text) => Some(text.clone()),
                Entry::Line(_) => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Serialize the entries as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.entries.borrow())
    }
}

impl Reporter for Transcript {
    fn report(&mut self, line: &str) {
        self.entries.borrow_mut().push(Entry::Line(line.to_string()));
    }

    fn report_error(&mut self, error: &Error) {
        self.entries.borrow_mut().push(Entry::Error(error.to_string()));
    }
}
