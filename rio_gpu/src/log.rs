//! Logging for the rio GPU layer
//!
//! This module provides a small pluggable logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for ERROR logs and failed contracts
//!
//! Besides the plain logging macros, `engine_err!`, `engine_bail!` and
//! `engine_ensure!` log an error and turn it into a `RioError` in one step.
//! Every fallible operation of the layer reports through them.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route engine messages elsewhere (file, in-game console, tests).
///
/// # Example
///
/// ```no_run
/// use rio_gpu::rio::log::{Logger, LogEntry};
///
/// struct ConsoleOverlay;
///
/// impl Logger for ConsoleOverlay {
///     fn log(&self, entry: &LogEntry) {
///         // Push to overlay...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "rio::gpu::Texture2D", "rio::cafe")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Per-call GPU command traces
    Trace,

    /// Resource creation and other development information
    Debug,

    /// Important informational messages
    Info,

    /// Recoverable oddities (redundant binds, ignored parameters)
    Warn,

    /// Contract violations and broken assets (with file:line)
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the default logger
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Format an entry as `[timestamp] [SEVERITY] [source] message (file:line)` without colors
pub fn format_entry(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");

    match (entry.file, entry.line) {
        (Some(file), Some(line)) => format!(
            "[{}] [{}] [{}] {} ({}:{})",
            timestamp,
            entry.severity.label(),
            entry.source,
            entry.message,
            file,
            line
        ),
        _ => format!(
            "[{}] [{}] [{}] {}",
            timestamp,
            entry.severity.label(),
            entry.source,
            entry.message
        ),
    }
}

/// Default logger implementation using colored console output
///
/// Colors:
/// - Trace: bright_black
/// - Debug: cyan
/// - Info: green
/// - Warn: yellow
/// - Error: red + bold
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
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

// ===== LOGGING MACROS =====

/// Log a TRACE message (per-call GPU command traces)
///
/// # Example
///
/// ```no_run
/// rio_gpu::engine_trace!("rio::cafe", "GX2SetShaderModeEx({})", 1);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::rio::Engine::log(
            $crate::rio::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```no_run
/// rio_gpu::engine_debug!("rio::gl", "Created texture {}x{}", 256, 256);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::rio::Engine::log(
            $crate::rio::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::rio::Engine::log(
            $crate::rio::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::rio::Engine::log(
            $crate::rio::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// rio_gpu::engine_error!("rio::gl", "Shader link failed: {}", "missing main");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::rio::Engine::log_detailed(
            $crate::rio::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and evaluate to a `RioError::BackendError` carrying the same message
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::rio::Engine::log_detailed(
            $crate::rio::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::rio::RioError::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(RioError::BackendError)` from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Check a caller contract; on failure log it and return `Err(RioError::ContractViolation)`
///
/// # Example
///
/// ```no_run
/// # fn f(size: usize) -> rio_gpu::rio::RioResult<()> {
/// rio_gpu::engine_ensure!(size % 4 == 0, "rio::gpu::UniformBlock", "size {} is not word aligned", size);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_ensure {
    ($cond:expr, $source:expr, $($arg:tt)*) => {
        if !($cond) {
            let message = format!($($arg)*);
            $crate::rio::Engine::log_detailed(
                $crate::rio::log::LogSeverity::Error,
                $source,
                message.clone(),
                file!(),
                line!()
            );
            return Err($crate::rio::RioError::ContractViolation(message));
        }
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
