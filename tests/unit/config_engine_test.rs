//! Unit tests for loading and saving `smartmark.json`.

use std::fs;

use tempfile::TempDir;

use rstest::rstest;

use smartmark::app::App;
use smartmark::services::config_engine::{ConfigEngine, ConfigEngineTrait, CONFIG_FILE_NAME};
use smartmark::types::config::AppConfig;
use smartmark::types::errors::ConfigError;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = ConfigEngine::new(Some(dir.path().to_path_buf()));
    assert_eq!(engine.load().unwrap(), AppConfig::default());
    assert_eq!(engine.database_path(), dir.path().join("smartmark.db"));
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"feed_capacity": 8}"#).unwrap();

    let mut engine = ConfigEngine::new(Some(dir.path().to_path_buf()));
    let config = engine.load().unwrap();
    assert_eq!(config.feed_capacity, 8);
    assert_eq!(config.database_file, "smartmark.db");
    assert_eq!(config.rate_limit_per_second, 200);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();

    let mut engine = ConfigEngine::new(Some(dir.path().to_path_buf()));
    assert!(matches!(engine.load(), Err(ConfigError::SerializationError(_))));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("nested").join("data");
    let engine = ConfigEngine::new(Some(nested.clone()));
    engine.save().unwrap();
    assert!(engine.get_config_path().exists());

    let mut reloaded = ConfigEngine::new(Some(nested));
    assert_eq!(reloaded.load().unwrap(), *engine.get_config());
}

#[rstest]
#[case(r#"{"feed_capacity": 0}"#)]
#[case(r#"{"feed_capacity": 18446744073709551615}"#)]
#[case(r#"{"rate_limit_per_second": 0}"#)]
fn test_out_of_range_values_are_rejected(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), content).unwrap();

    let mut engine = ConfigEngine::new(Some(dir.path().to_path_buf()));
    assert!(matches!(engine.load(), Err(ConfigError::InvalidValue(_))));
    assert_eq!(*engine.get_config(), AppConfig::default());
}

#[test]
fn test_app_refuses_oversized_feed_capacity() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"feed_capacity": 18446744073709551615}"#).unwrap();
    assert!(App::new(dir.path()).is_err());
}

#[test]
fn test_app_uses_loaded_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"database_file": "marks.db"}"#).unwrap();

    let mut engine = ConfigEngine::new(Some(dir.path().to_path_buf()));
    engine.load().unwrap();
    let app = App::with_config(engine).unwrap();
    assert_eq!(app.config.get_config().database_file, "marks.db");
    assert!(dir.path().join("marks.db").exists());
}
