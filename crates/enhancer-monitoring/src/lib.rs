//! Logging setup shared by the enhancement chain binaries.

use serde::Deserialize;

pub mod logging;

pub use logging::init_logging;

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,enhancer_chain=debug"), used when
    /// `RUST_LOG` is not set
    pub log_filter: String,
    /// Emit JSON instead of human readable logs
    pub enable_json_logging: bool,
    /// Optional log file, rotated daily
    pub log_file: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "chainctl".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
            log_file: None,
        }
    }
}
