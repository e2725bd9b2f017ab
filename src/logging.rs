/// Structured logging for the risk monitoring service
///
/// Provides context-rich logging with subsystem/source identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for daemon operations.
///
/// The logger is an explicitly constructed value passed into the scheduler
/// and orchestrator at startup — there is no process-wide singleton, so
/// tests can build their own instances without interference.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parse a config-file level name ("debug", "info", "warn", "error").
    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Subsystem Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Scheduler,
    Orchestrator,
    Push,
    Realtime,
    Database,
    System,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Scheduler => write!(f, "SCHED"),
            Subsystem::Orchestrator => write!(f, "ORCH"),
            Subsystem::Push => write!(f, "PUSH"),
            Subsystem::Realtime => write!(f, "RT"),
            Subsystem::Database => write!(f, "DB"),
            Subsystem::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    pub fn new(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
        }
    }

    /// Console-only logger at the given level; handy for tests and tools.
    pub fn console(min_level: LogLevel) -> Self {
        Logger::new(min_level, None, false)
    }

    fn log(&self, level: LogLevel, subsystem: Subsystem, source_id: Option<i32>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let source_part = source_id.map(|s| format!(" [source {}]", s)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, subsystem, source_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info => println!("{}", log_entry),
                LogLevel::Debug => println!("[DEBUG] {}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", subsystem, source_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", subsystem, source_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }

    pub fn info(&self, subsystem: Subsystem, source_id: Option<i32>, message: &str) {
        self.log(LogLevel::Info, subsystem, source_id, message);
    }

    pub fn warn(&self, subsystem: Subsystem, source_id: Option<i32>, message: &str) {
        self.log(LogLevel::Warning, subsystem, source_id, message);
    }

    pub fn error(&self, subsystem: Subsystem, source_id: Option<i32>, message: &str) {
        self.log(LogLevel::Error, subsystem, source_id, message);
    }

    pub fn debug(&self, subsystem: Subsystem, source_id: Option<i32>, message: &str) {
        self.log(LogLevel::Debug, subsystem, source_id, message);
    }
}

// ---------------------------------------------------------------------------
// Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one recalculation cycle.
pub fn log_cycle_summary(logger: &Logger, total: usize, alerts_created: usize, notify_failures: usize) {
    let message = format!(
        "Cycle complete: {} sources recalculated, {} alerts created, {} notification failures",
        total, alerts_created, notify_failures
    );

    if notify_failures == 0 {
        logger.info(Subsystem::Scheduler, None, &message);
    } else {
        logger.warn(Subsystem::Scheduler, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("nope"), None);
    }

    #[test]
    fn test_messages_below_min_level_are_dropped() {
        // A console logger at Error level must not panic or write files
        // for lower-severity messages; this exercises the filter path.
        let logger = Logger::console(LogLevel::Error);
        logger.debug(Subsystem::Scheduler, Some(1), "ignored");
        logger.info(Subsystem::Scheduler, Some(1), "ignored");
    }
}
