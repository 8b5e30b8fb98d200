use serde::{Deserialize, Serialize};

/// Application configuration stored as `smartmark.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file name, relative to the data directory.
    pub database_file: String,
    /// Events buffered per subscriber before it is reported as lagging.
    pub feed_capacity: usize,
    pub rate_limit_per_second: u32,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `SMARTMARK_LOG`.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_file: "smartmark.db".to_string(),
            feed_capacity: 256,
            rate_limit_per_second: 200,
            log_filter: "info".to_string(),
        }
    }
}
