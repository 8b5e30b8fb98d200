// SmartMark Config Engine
// Loads and saves `smartmark.json` in the data directory and resolves where that directory is.

use std::fs;
use std::path::{Path, PathBuf};

use crate::store::change_feed::MAX_CAPACITY;
use crate::types::config::AppConfig;
use crate::types::errors::ConfigError;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "SMARTMARK_DATA_DIR";

/// Environment variable overriding `log_filter`.
pub const LOG_ENV: &str = "SMARTMARK_LOG";

pub const CONFIG_FILE_NAME: &str = "smartmark.json";

/// Trait defining the config engine interface.
pub trait ConfigEngineTrait {
    fn load(&mut self) -> Result<AppConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &AppConfig;
    fn get_config_path(&self) -> &Path;
}

/// Config engine persisting [`AppConfig`] as JSON on disk.
pub struct ConfigEngine {
    data_dir: PathBuf,
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigEngine {
    /// Creates an engine rooted at `data_dir`, or at [`default_data_dir`] when `None`.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        Self {
            data_dir,
            config_path,
            config: AppConfig::default(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.database_file)
    }

    /// Log filter directive, `SMARTMARK_LOG` first.
    pub fn log_filter(&self) -> String {
        std::env::var(LOG_ENV).unwrap_or_else(|_| self.config.log_filter.clone())
    }
}

impl ConfigEngineTrait for ConfigEngine {
    /// Loads the config file. A missing file yields defaults; a malformed
    /// one is an error.
    fn load(&mut self) -> Result<AppConfig, ConfigError> {
        if !self.config_path.exists() {
            self.config = AppConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        check(&config)?;
        self.config = config;
        Ok(self.config.clone())
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_config(&self) -> &AppConfig {
        &self.config
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}

fn check(config: &AppConfig) -> Result<(), ConfigError> {
    if config.feed_capacity == 0 || config.feed_capacity > MAX_CAPACITY {
        return Err(ConfigError::InvalidValue(format!(
            "feed_capacity must be between 1 and {}, got {}",
            MAX_CAPACITY, config.feed_capacity
        )));
    }
    if config.rate_limit_per_second == 0 {
        return Err(ConfigError::InvalidValue(
            "rate_limit_per_second must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// `SMARTMARK_DATA_DIR` if set, else the executable's directory, else `.`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
