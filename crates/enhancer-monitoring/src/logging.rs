//! Structured logging using tracing.
//!
//! Console output goes to stderr, pretty for interactive use or JSON for log
//! aggregation. An optional log file is rotated daily and always JSON.

use anyhow::Context;
use std::path::Path;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::MonitoringConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence over [`MonitoringConfig::log_filter`].
pub fn init_logging(config: &MonitoringConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .with_context(|| format!("Invalid log filter '{}'", config.log_filter))?;

    let json_layer = config.enable_json_logging.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });

    let pretty_layer = (!config.enable_json_logging).then(|| {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });

    let file_layer = config
        .log_file
        .as_deref()
        .map(file_appender)
        .transpose()?
        .map(|appender| {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(appender)
        });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    info!(
        service_name = %config.service_name,
        log_format = if config.enable_json_logging { "json" } else { "pretty" },
        log_file = ?config.log_file,
        "Logging initialized"
    );

    Ok(())
}

fn file_appender(log_file: &str) -> anyhow::Result<RollingFileAppender> {
    let path = Path::new(log_file);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file '{}' has no file name", log_file))?;

    Ok(RollingFileAppender::new(Rotation::DAILY, directory, file_name))
}

/// Initializes test tracing for unit tests
pub fn init_test_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_target(false)
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_appender_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("chainctl.log");
        assert!(file_appender(&log_file.to_string_lossy()).is_ok());
    }

    #[test]
    fn test_file_appender_rejects_directory_path() {
        assert!(file_appender("..").is_err());
    }
}
