//! Shared test helpers for integration tests

use tickloop::lessons;
use tickloop::{EventLoop, RunResult, Transcript};

/// Run a lesson scenario and return its output lines
pub fn scenario_lines(name: &str) -> Vec<String> {
    let (transcript, _) = lessons::find(name).unwrap().record();
    transcript.lines()
}

/// Run a lesson scenario and return the transcript and drain outcome
#[allow(dead_code)]
pub fn run_scenario(name: &str) -> (Transcript, tickloop::Result<RunResult>) {
    lessons::find(name).unwrap().record()
}

/// A loop that records into the returned transcript
#[allow(dead_code)]
pub fn recording_loop() -> (EventLoop, Transcript) {
    let transcript = Transcript::new();
    (EventLoop::with_reporter(transcript.clone()), transcript)
}
