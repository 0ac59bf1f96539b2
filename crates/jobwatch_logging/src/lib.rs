#![deny(missing_docs)]
//! Shared logging utilities for the jobwatch workspace.
//!
//! This crate provides the `jw_*` logging macros used by the engine and the
//! CLI, the logger setup used by the binary, and an idempotent initializer
//! for tests.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// `trace!` through the re-exported `log` crate.
#[macro_export]
macro_rules! jw_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// `debug!` through the re-exported `log` crate.
#[macro_export]
macro_rules! jw_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// `info!` through the re-exported `log` crate.
#[macro_export]
macro_rules! jw_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// `warn!` through the re-exported `log` crate.
#[macro_export]
macro_rules! jw_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// `error!` through the re-exported `log` crate.
#[macro_export]
macro_rules! jw_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given file, truncating it first.
    File(PathBuf),
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both the terminal and the given file.
    Both(PathBuf),
}

impl LogDestination {
    /// Picks `Both` when a log file is configured, otherwise `Terminal`.
    pub fn from_optional_file(path: Option<&Path>) -> Self {
        match path {
            Some(path) => LogDestination::Both(path.to_path_buf()),
            None => LogDestination::Terminal,
        }
    }
}

/// Initialize the global logger.
///
/// Returns `false` if a logger was already installed or no sink could be
/// created; the process keeps running either way.
pub fn initialize(destination: LogDestination, level: LevelFilter) -> bool {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => match create_file_logger(&path, level, config) {
            Some(file_logger) => vec![file_logger],
            None => return false,
        },
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both(path) => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(&path, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    CombinedLogger::init(loggers).is_ok()
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_file_selects_destination() {
        assert_eq!(
            LogDestination::from_optional_file(None),
            LogDestination::Terminal
        );
        let path = PathBuf::from("jobwatch.log");
        assert_eq!(
            LogDestination::from_optional_file(Some(&path)),
            LogDestination::Both(path.clone())
        );
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        // A directory cannot be opened as a log file.
        let level = LevelFilter::Info;
        assert!(create_file_logger(temp.path(), level, build_config()).is_none());
    }

    #[test]
    fn test_initializer_is_idempotent() {
        initialize_for_tests();
        initialize_for_tests();
        jw_info!("logger initialized twice without panicking");
    }
}
