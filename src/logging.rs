//! Structured logging for ScootVolt
//!
//! A small `log::Log` implementation that writes timestamped entries to stderr
//! and optionally to a file. Debug output is additionally gated per category
//! so that, for example, OCR candidate tracing can be switched on without the
//! settings chatter.

use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, Once, RwLock};
use std::time::Instant;

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

use crate::config::LogLevel;
use crate::error::ErrorContext;

/// Timestamp format for log entries
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Global initialization guard
static INIT_LOGGER: Once = Once::new();

/// Debug categories, one per top-level area of the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCategory {
    /// Bounds, percentage, safety tiers, advisories
    Engine,
    /// Manual entry parsing and OCR text scanning
    Reading,
    /// Settings loading, saving, validation
    Config,
    /// Calculator session and debouncing
    App,
}

impl DebugCategory {
    /// Category for a log target such as `scootvolt::battery::engine`
    pub fn for_target(target: &str) -> Option<Self> {
        let area = target.split("::").nth(1)?;
        match area {
            "battery" => Some(DebugCategory::Engine),
            "reading" => Some(DebugCategory::Reading),
            "config" => Some(DebugCategory::Config),
            "app" => Some(DebugCategory::App),
            _ => None,
        }
    }
}

/// Debug flag categories for selective logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub engine: bool,
    pub reading: bool,
    pub config: bool,
    pub app: bool,
    /// Enable all debug output
    pub all: bool,
}

impl DebugFlags {
    /// Every category enabled
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Whether `category` is enabled
    pub fn enabled(&self, category: DebugCategory) -> bool {
        self.all
            || match category {
                DebugCategory::Engine => self.engine,
                DebugCategory::Reading => self.reading,
                DebugCategory::Config => self.config,
                DebugCategory::App => self.app,
            }
    }
}

impl FromStr for DebugFlags {
    type Err = String;

    /// Parse a comma separated list such as `engine,config` or `all`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = DebugFlags::default();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "engine" => flags.engine = true,
                "reading" => flags.reading = true,
                "config" => flags.config = true,
                "app" => flags.app = true,
                "all" => flags.all = true,
                other => return Err(format!("Unknown debug category: {}", other)),
            }
        }
        Ok(flags)
    }
}

/// Global debug flags storage
static DEBUG_FLAGS: RwLock<DebugFlags> = RwLock::new(DebugFlags {
    engine: false,
    reading: false,
    config: false,
    app: false,
    all: false,
});

/// Logger writing to stderr and an optional file
pub struct ScootVoltLogger {
    /// File output for logs
    file: Option<Mutex<File>>,
    /// Log level filter
    level: LevelFilter,
    /// Whether to output to stderr
    console_output: bool,
}

impl log::Log for ScootVoltLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        match metadata.level() {
            Level::Debug | Level::Trace => should_log_debug(metadata.target()),
            _ => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if self.console_output {
            let entry = format_entry(record, true);
            let _ = io::stderr().write_all(entry.as_bytes());
        }

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(format_entry(record, false).as_bytes());
                let _ = file.flush();
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Format one log line; `colored` adds ANSI colors to the level
fn format_entry(record: &Record, colored: bool) -> String {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let level = if colored {
        match record.level() {
            Level::Error => "\x1B[31mERROR\x1B[0m",
            Level::Warn => "\x1B[33mWARN \x1B[0m",
            Level::Info => "\x1B[32mINFO \x1B[0m",
            Level::Debug => "\x1B[36mDEBUG\x1B[0m",
            Level::Trace => "\x1B[90mTRACE\x1B[0m",
        }
        .to_string()
    } else {
        format!("{:<5}", record.level())
    };

    format!(
        "[{}] {} [{}] {}\n",
        timestamp,
        level,
        record.module_path().unwrap_or("<unknown>"),
        record.args()
    )
}

/// Configure logging with the specified level and optionally a log file.
/// Only the first call installs the logger.
pub fn configure_logging(
    level: LogLevel,
    log_file: Option<PathBuf>,
    console_output: bool,
) -> Result<(), String> {
    let mut result = Ok(());

    INIT_LOGGER.call_once(|| {
        let level_filter = level.to_level_filter();

        let file = match log_file.as_ref() {
            Some(path) => match open_log_file(path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(e) => {
                    result = Err(e);
                    return;
                }
            },
            None => None,
        };

        let logger = Box::new(ScootVoltLogger {
            file,
            level: level_filter,
            console_output,
        });

        if let Err(e) = log::set_boxed_logger(logger) {
            result = Err(format!("Failed to set logger: {}", e));
            return;
        }
        log::set_max_level(level_filter);

        log::info!("Logging initialized at level: {}", level);
        if let Some(path) = log_file {
            log::info!("Log file: {}", path.display());
        }
    });

    result
}

fn open_log_file(path: &Path) -> Result<File, String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create log directory: {}", e))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file: {}", e))
}

/// Set global debug flags for selective logging
pub fn set_debug_flags(flags: DebugFlags) {
    if let Ok(mut debug_flags) = DEBUG_FLAGS.write() {
        *debug_flags = flags;
    }
}

/// Current debug flags
pub fn debug_flags() -> DebugFlags {
    DEBUG_FLAGS.read().map(|flags| *flags).unwrap_or_default()
}

/// Whether debug output from `target` should be written. Targets outside the
/// known categories (the binary, dependencies) follow the level filter only.
pub fn should_log_debug(target: &str) -> bool {
    match DebugCategory::for_target(target) {
        Some(category) => debug_flags().enabled(category),
        None => true,
    }
}

/// Log an error with context
pub fn log_error<E: Debug>(error: &E, context: &ErrorContext) {
    log::error!("[{}] Error: {:?}", context, error);

    if let Some(msg) = &context.user_message {
        log::error!(
            "[{}::{}] User message: {}",
            context.component,
            context.operation,
            msg
        );
    }
}

/// Log an error with the recovery that was applied
pub fn log_error_with_recovery<E: Debug>(error: &E, context: &ErrorContext, recovery: &str) {
    log_error(error, context);
    log::info!(
        "[{}::{}] Recovery action: {}",
        context.component,
        context.operation,
        recovery
    );
}

/// Times an operation and logs the elapsed time at debug level when finished
pub struct PerformanceLogger {
    /// Operation being timed
    operation: String,
    /// Component performing the operation
    component: String,
    /// Start time
    start_time: Instant,
}

impl PerformanceLogger {
    /// Start timing `component::operation`
    pub fn new<S: Into<String>>(component: S, operation: S) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            start_time: Instant::now(),
        }
    }

    /// Finish timing, naming what was processed
    pub fn finish_with_context(self, context: &str) {
        log::debug!(
            "[{}::{}] Operation '{}' completed in {:?}",
            self.component,
            self.operation,
            context,
            self.start_time.elapsed()
        );
    }
}
