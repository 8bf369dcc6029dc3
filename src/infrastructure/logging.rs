//! Logging system configuration and initialization
//!
//! This module provides the logging setup for harvesting runs:
//! - Console output on stderr (stdout carries the harvested records)
//! - Optional file output in a log directory next to the executable
//! - Optional structured JSON lines
//! - Level and per-module filters from config, overridable with `RUST_LOG`
//! - Local-time timestamps

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use tracing::subscriber::DefaultGuard;
use tracing::{Level, info};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::{self, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

// Re-export LoggingConfig from config module
pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());
}

/// Timestamps in the machine's local time zone
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Console subscriber for this thread until the returned guard is dropped
///
/// Covers startup work that runs before the configured subscriber can be
/// installed, such as loading (and possibly resetting) the config file.
pub fn bootstrap_console_logging() -> DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(LocalTimeFormatter)
        .with_target(false)
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Filter from `RUST_LOG` if set, otherwise from the configured level and module filters
///
/// ```bash
/// # Show HTTP client internals
/// RUST_LOG="debug,reqwest=debug,hyper=debug" harvest
/// ```
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    config_filter(config)
}

fn config_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    // Dependency noise stays suppressed unless TRACE is requested
    if !config.level.eq_ignore_ascii_case("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        for (module, level) in modules {
            let directive = format!("{}={}", module, level)
                .parse()
                .with_context(|| format!("Invalid module filter {}={}", module, level))?;
            filter = filter.add_directive(directive);
        }
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(config)?;
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let log_dir = get_log_directory();
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

        let file_appender = rolling::never(&log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);

        // Store the guard globally to prevent it from being dropped
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let file_layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_ansi(false);
        if config.json_format {
            layers.push(
                file_layer
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .boxed(),
            );
        } else {
            layers.push(file_layer.with_target(false).boxed());
        }
    }

    if config.console_output {
        let console_layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimeFormatter)
            .with_target(false);
        if config.json_format {
            layers.push(console_layer.json().boxed());
        } else {
            layers.push(console_layer.boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_output);
        assert!(!config.file_output);
        assert_eq!(
            config.module_filters.get("reqwest").map(String::as_str),
            Some("warn")
        );
    }

    #[test]
    fn test_log_directory_location() {
        assert!(get_log_directory().to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_config_filter_accepts_defaults() {
        let filter = config_filter(&LoggingConfig::default()).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("reqwest=warn"));
        assert!(rendered.contains("info"));
    }

    #[test]
    fn test_trace_level_keeps_dependency_logs() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            ..LoggingConfig::default()
        };
        let rendered = config_filter(&config).unwrap().to_string();
        assert!(!rendered.contains("reqwest=warn"));
    }

    #[test]
    fn test_bootstrap_logging_reports_config_problems() {
        let _guard = bootstrap_console_logging();
        assert!(tracing::enabled!(Level::WARN));
        assert!(tracing::enabled!(Level::INFO));
        assert!(!tracing::enabled!(Level::DEBUG));
    }

    #[test]
    fn test_no_output_is_rejected() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }
}
