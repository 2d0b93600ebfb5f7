//! Logging and diagnostics for the frame graph
//!
//! This module provides:
//! - Customizable logger via the Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - A per-graph Diagnostics sink with a deduplicated warn-once table
//!
//! There is deliberately no process-wide logger: every Graph owns its
//! Diagnostics so that two graphs in one process cannot corrupt each
//! other's warning tables or counters.

use colored::*;
use std::sync::Mutex;
use std::time::SystemTime;
use chrono::{DateTime, Local};
use rustc_hash::FxHashSet;

/// Logger trait for custom logging implementations
///
/// Implement this trait to create custom loggers (file logging,
/// in-memory capture for tests, etc.) and install them with
/// [`Diagnostics::with_logger`].
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source component (e.g., "framegraph::FrameTree", "framegraph::Eye")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information (typically disabled in release)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (degenerate configuration, stale caches)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        // Format timestamp as YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

/// Per-graph diagnostics sink.
///
/// Wraps a [`Logger`] with a deduplicated warning table: configuration
/// warnings are logged once per distinct message text and then
/// suppressed. The table is interior-mutable so that read-only queries
/// (visibility checks on stale equations) can still report problems.
pub struct Diagnostics {
    logger: Box<dyn Logger>,
    emitted: Mutex<FxHashSet<String>>,
}

impl Diagnostics {
    /// Create a diagnostics sink backed by the [`DefaultLogger`]
    pub fn new() -> Self {
        Self::with_logger(DefaultLogger)
    }

    /// Create a diagnostics sink backed by a custom logger
    pub fn with_logger<L: Logger + 'static>(logger: L) -> Self {
        Self {
            logger: Box::new(logger),
            emitted: Mutex::new(FxHashSet::default()),
        }
    }

    /// Replace the logger, keeping the warn-once table
    pub fn set_logger<L: Logger + 'static>(&mut self, logger: L) {
        self.logger = Box::new(logger);
    }

    /// Forget every previously deduplicated warning
    pub fn reset_warnings(&self) {
        if let Ok(mut emitted) = self.emitted.lock() {
            emitted.clear();
        }
    }

    /// Log an INFO message
    pub fn info(&self, source: &str, message: impl Into<String>) {
        self.emit(LogSeverity::Info, source, message.into(), None, None);
    }

    /// Log a WARN message unconditionally
    pub fn warn(&self, source: &str, message: impl Into<String>) {
        self.emit(LogSeverity::Warn, source, message.into(), None, None);
    }

    /// Log a WARN message once per distinct message text.
    ///
    /// Returns true if the message was actually logged, false if it was
    /// suppressed as a duplicate.
    pub fn warn_once(&self, source: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        let fresh = match self.emitted.lock() {
            Ok(mut emitted) => emitted.insert(message.clone()),
            Err(_) => true,
        };
        if fresh {
            self.emit(LogSeverity::Warn, source, message, None, None);
        }
        fresh
    }

    /// Log an ERROR message with file:line information
    ///
    /// Use through the [`graph_error!`](crate::graph_error) macro so the
    /// call site is captured automatically.
    pub fn error_detailed(
        &self,
        source: &str,
        message: impl Into<String>,
        file: &'static str,
        line: u32,
    ) {
        self.emit(LogSeverity::Error, source, message.into(), Some(file), Some(line));
    }

    fn emit(
        &self,
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file,
            line,
        });
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Log an ERROR message with file:line information through a Diagnostics sink
///
/// # Example
///
/// ```no_run
/// # use framegraph_engine::log::Diagnostics;
/// # use framegraph_engine::graph_error;
/// # let diagnostics = Diagnostics::new();
/// graph_error!(diagnostics, "framegraph::Graph", "unproject failed: {}", "singular");
/// ```
#[macro_export]
macro_rules! graph_error {
    ($diagnostics:expr, $source:expr, $($arg:tt)*) => {
        $diagnostics.error_detailed($source, format!($($arg)*), file!(), line!())
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
