//! Output channels for rendered log lines
//!
//! The interceptor never prints anything itself. Lines go to a [`LogSink`]
//! together with a tag (the simple name of the declaring type) and a level.
//! Sink failures are reported back as [`SinkError`] and swallowed by the
//! interceptor, so a broken sink can never fail the call being logged.

use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Severity of a sink line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Entry and exit lines
    Verbose,
    /// Stack dumps
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Verbose => "V",
            Level::Debug => "D",
        };
        f.write_str(name)
    }
}

/// Errors a sink may report
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink lock poisoned")]
    Poisoned,

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Receiver of rendered log lines
///
/// Implementations are shared across every thread that runs intercepted
/// calls and should return quickly.
pub trait LogSink: Send + Sync {
    fn write(&self, tag: &str, message: &str, level: Level) -> Result<(), SinkError>;
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn write(&self, tag: &str, message: &str, level: Level) -> Result<(), SinkError> {
        (**self).write(tag, message, level)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&self, tag: &str, message: &str, level: Level) -> Result<(), SinkError> {
        (**self).write(tag, message, level)
    }
}

/// Sink that forwards lines as `tracing` events
///
/// Events are emitted under the `debuglog` target with the tag as a field, so
/// any installed subscriber decides where they end up. `Verbose` maps to
/// `TRACE` and `Debug` to `DEBUG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn write(&self, tag: &str, message: &str, level: Level) -> Result<(), SinkError> {
        match level {
            Level::Verbose => tracing::trace!(target: "debuglog", tag, "{}", message),
            Level::Debug => tracing::debug!(target: "debuglog", tag, "{}", message),
        }
        Ok(())
    }
}

/// One line captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub tag: String,
    pub message: String,
    pub level: Level,
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines, oldest first
    pub fn lines(&self) -> Vec<LogLine> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Captured messages at `level`, oldest first
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .map(|line| line.message)
            .collect()
    }

    /// Captured `Verbose` messages: the entry and exit lines
    pub fn messages(&self) -> Vec<String> {
        self.messages_at(Level::Verbose)
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn write(&self, tag: &str, message: &str, level: Level) -> Result<(), SinkError> {
        let mut lines = self.lines.lock().map_err(|_| SinkError::Poisoned)?;
        lines.push(LogLine {
            tag: tag.to_string(),
            message: message.to_string(),
            level,
        });
        Ok(())
    }
}
