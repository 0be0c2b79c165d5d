//! Diagnostics reporting shared by every conversion stage.
//!
//! All stages report through a single [Logger] callback so host tools can
//! route converter output wherever they want. [StdLogger] forwards events to
//! the `log` facade; [MemoryLogger] collects them for inspection.

use crate::{Column, Line};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How severe a reported event is
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum Severity {
    Trace,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Which conversion stage reported an event
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum LogSource {
    General,
    Scanner,
    Parser,
    Resolver,
    Output,
}

/// One reported diagnostic with an optional source position
#[derive(PartialEq, Debug, Clone)]
pub struct LogEvent<'a> {
    pub severity: Severity,
    pub source: LogSource,
    pub message: &'a str,
    pub path: &'a Path,
    pub line: Option<Line>,
    pub column: Option<Column>,
}

impl<'a> LogEvent<'a> {
    /// Make an event with a known source position
    pub fn at(
        severity: Severity,
        source: LogSource,
        message: &'a str,
        path: &'a Path,
        line: Line,
        column: Column,
    ) -> LogEvent<'a> {
        LogEvent {
            severity,
            source,
            message,
            path,
            line: Some(line),
            column: Some(column),
        }
    }

    /// Make an event that refers to a whole file
    pub fn file(
        severity: Severity,
        source: LogSource,
        message: &'a str,
        path: &'a Path,
    ) -> LogEvent<'a> {
        LogEvent {
            severity,
            source,
            message,
            path,
            line: None,
            column: None,
        }
    }
}

impl std::fmt::Display for LogEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let source = match self.source {
            LogSource::General => "general",
            LogSource::Scanner => "scanner",
            LogSource::Parser => "parser",
            LogSource::Resolver => "resolver",
            LogSource::Output => "output",
        };
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(
                f,
                "{}({},{}): [{}] {}",
                self.path.display(),
                line,
                column,
                source,
                self.message
            ),
            _ => write!(f, "{}: [{}] {}", self.path.display(), source, self.message),
        }
    }
}

/// Sink for conversion diagnostics
pub trait Logger {
    fn log(&self, event: LogEvent);
}

impl<F> Logger for F
where
    F: Fn(LogEvent),
{
    fn log(&self, event: LogEvent) {
        self(event)
    }
}

/// Logger that forwards every event to the `log` facade
#[derive(Default)]
pub struct StdLogger;

impl Logger for StdLogger {
    fn log(&self, event: LogEvent) {
        let level = match event.severity {
            Severity::Trace => log::Level::Trace,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Fatal => log::Level::Error,
        };
        log::log!(level, "{}", event);
    }
}

/// Owned copy of a reported event
#[derive(PartialEq, Debug, Clone)]
pub struct OwnedLogEvent {
    pub severity: Severity,
    pub source: LogSource,
    pub message: String,
    pub path: PathBuf,
    pub line: Option<Line>,
    pub column: Option<Column>,
}

/// Logger that records every event, used by tests and batch tooling that
/// inspects diagnostics after a run
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<OwnedLogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> MemoryLogger {
        MemoryLogger::default()
    }

    /// Take a snapshot of all recorded events
    pub fn events(&self) -> Vec<OwnedLogEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Check if any event with at least Error severity was recorded
    pub fn has_errors(&self) -> bool {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|event| event.severity >= Severity::Error)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: LogEvent) {
        let owned = OwnedLogEvent {
            severity: event.severity,
            source: event.source,
            message: event.message.to_string(),
            path: event.path.to_path_buf(),
            line: event.line,
            column: event.column,
        };
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(owned);
    }
}
