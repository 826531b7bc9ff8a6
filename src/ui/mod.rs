//! User interface module - reporting progress and diagnostics.
//!
//! - `formatter` - Pure formatting functions
//! - This module - The [Reporter] seam and its terminal and recording implementations

use std::sync::Mutex;

use crate::failure::GitFlowFailureInfo;

pub mod formatter;

pub use formatter::{format_error, format_failure, format_status, format_success, format_warning};

/// Receives user-facing messages from the workflow
pub trait Reporter {
    fn status(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn failure(&self, info: &GitFlowFailureInfo);
}

/// Prints to the terminal; progress on stdout, problems on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn status(&self, message: &str) {
        println!("{}", format_status(message));
    }

    fn success(&self, message: &str) {
        println!("{}", format_success(message));
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", format_warning(message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", format_error(message));
    }

    fn failure(&self, info: &GitFlowFailureInfo) {
        eprintln!("{}", format_failure(info));
    }
}

/// Message severity as seen by a [RecordingReporter]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Status,
    Success,
    Warning,
    Error,
    Failure,
}

/// Keeps every message in memory, for tests and callers embedding the workflow
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, level: Level, message: String) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message));
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::Warning)
    }

    /// Messages of every level except warnings, in order
    pub fn output_without_warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l != Level::Warning)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn status(&self, message: &str) {
        self.record(Level::Status, message.to_string());
    }

    fn success(&self, message: &str) {
        self.record(Level::Success, message.to_string());
    }

    fn warning(&self, message: &str) {
        self.record(Level::Warning, message.to_string());
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message.to_string());
    }

    fn failure(&self, info: &GitFlowFailureInfo) {
        self.record(Level::Failure, info.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_levels() {
        let reporter = RecordingReporter::new();
        reporter.status("start");
        reporter.warning("old goal");
        reporter.success("done");

        assert_eq!(reporter.warnings(), vec!["old goal".to_string()]);
        assert_eq!(
            reporter.output_without_warnings(),
            vec!["start".to_string(), "done".to_string()]
        );
        assert_eq!(reporter.messages().len(), 3);
    }

    #[test]
    fn test_recording_reporter_failure_uses_plain_text() {
        let reporter = RecordingReporter::new();
        let info = GitFlowFailureInfo::new("P", "S", vec!["step".to_string()]);
        reporter.failure(&info);

        assert_eq!(reporter.messages_at(Level::Failure), vec![info.to_string()]);
    }
}
