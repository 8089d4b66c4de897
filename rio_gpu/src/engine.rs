//! rio Engine - process-wide logging hub
//!
//! GPU state is deliberately not stored here: shader mode, viewport and
//! render-target bindings live in `GraphicsContext`. The only global this
//! layer keeps is the logger, so that every component and backend can report
//! without threading a logger through each call.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<LoggerState>> = OnceLock::new();

/// Installed logger plus its severity threshold
struct LoggerState {
    logger: Box<dyn Logger>,
    min_severity: LogSeverity,
}

impl LoggerState {
    fn new() -> Self {
        Self {
            logger: Box::new(DefaultLogger),
            min_severity: LogSeverity::Trace,
        }
    }
}

fn logger_state() -> &'static RwLock<LoggerState> {
    LOGGER.get_or_init(|| RwLock::new(LoggerState::new()))
}

// ===== PUBLIC API =====

/// Logging front-end used by the `engine_*!` macros
///
/// # Example
///
/// ```no_run
/// use rio_gpu::rio::Engine;
/// use rio_gpu::rio::log::LogSeverity;
///
/// Engine::set_min_severity(LogSeverity::Info);
/// Engine::log(LogSeverity::Info, "rio::app", "Graphics context ready".to_string());
/// Engine::reset_logger();
/// ```
pub struct Engine;

impl Engine {
    /// Replace the current logger
    ///
    /// # Arguments
    ///
    /// * `logger` - Any type implementing the Logger trait
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rio_gpu::rio::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut state) = logger_state().write() {
            state.logger = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger) and let every severity through
    pub fn reset_logger() {
        if let Ok(mut state) = logger_state().write() {
            *state = LoggerState::new();
        }
    }

    /// Drop every message below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        if let Ok(mut state) = logger_state().write() {
            state.min_severity = severity;
        }
    }

    /// Current severity threshold
    pub fn min_severity() -> LogSeverity {
        logger_state()
            .read()
            .map(|state| state.min_severity)
            .unwrap_or(LogSeverity::Trace)
    }

    /// Logging method for simple logs without file:line
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "rio::gpu::Texture2D")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error!, engine_err!, engine_bail! and engine_ensure!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if let Ok(state) = logger_state().read() {
            if severity < state.min_severity {
                return;
            }
            state.logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
