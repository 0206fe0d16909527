//! Structured logging with visual formatting.
//!
//! stromme runs on a wall display with its console usually captured by the
//! service manager, so output is kept line-oriented: semantic messages carry a
//! `[LEVEL]` prefix, while status blocks use box-drawing characters to group
//! related lines. Output can be silenced entirely (tests, one-shot commands
//! piping their result) and debug messages are only shown when requested.

use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Log level enumeration for categorizing message importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,   // Normal operational logs
    Warn,  // Non-fatal issues
    Err,   // Recoverable failures (persistence, subscribers)
    Info,  // Status updates
    Debug, // Only shown with --debug
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Log => "[LOG]",
            LogLevel::Warn => "[WARN]",
            LogLevel::Err => "[ERR]",
            LogLevel::Info => "[INFO]",
            LogLevel::Debug => "[DEBUG]",
        }
    }
}

/// Main logging interface providing structured output formatting.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Show or hide [`LogLevel::Debug`] messages.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Whether debug messages are printed.
    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Format a message for `level` without printing it.
    pub fn format_line(level: LogLevel, message: &str) -> String {
        format!("{} {}", level.prefix(), message)
    }

    /// Main log function with level-based prefixes.
    pub fn log(level: LogLevel, message: &str) {
        if !Self::is_enabled() || (level == LogLevel::Debug && !Self::is_debug()) {
            return;
        }
        match level {
            LogLevel::Warn | LogLevel::Err => eprintln!("{}", Self::format_line(level, message)),
            _ => println!("{}", Self::format_line(level, message)),
        }
    }

    // ═══ Convenience Methods ═══

    /// Log at error level.
    pub fn log_error(message: &str) {
        Self::log(LogLevel::Err, message);
    }

    /// Log at warning level.
    pub fn log_warning(message: &str) {
        Self::log(LogLevel::Warn, message);
    }

    /// Log at info level.
    pub fn log_info(message: &str) {
        Self::log(LogLevel::Info, message);
    }

    /// Log at debug level; silent unless debug output is on.
    pub fn log_debug(message: &str) {
        Self::log(LogLevel::Debug, message);
    }

    /// Log a plain message.
    pub fn log_message(message: &str) {
        Self::log(LogLevel::Log, message);
    }

    // ═══ Visual Formatting Functions ═══

    /// Log a status line attached to the current block.
    pub fn log_decorated(message: &str) {
        if Self::is_enabled() {
            println!("┣ {}", message);
        }
    }

    /// Log a detail line under the current status line.
    pub fn log_indented(message: &str) {
        if Self::is_enabled() {
            println!("┃   {}", message);
        }
    }

    /// Log an empty pipe line for spacing.
    pub fn log_pipe() {
        if Self::is_enabled() {
            println!("┃");
        }
    }

    /// Start a new block of related status lines.
    pub fn log_block_start(message: &str) {
        if Self::is_enabled() {
            println!("┃");
            println!("┣ {}", message);
        }
    }

    /// Log the application version header.
    pub fn log_version() {
        if Self::is_enabled() {
            println!("┏ stromme v{} ━━╸", env!("CARGO_PKG_VERSION"));
            println!("┃");
        }
    }

    /// Close the visual structure when the application ends.
    pub fn log_end() {
        if Self::is_enabled() {
            println!("╹");
        }
    }
}
