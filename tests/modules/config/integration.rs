//! 配置模块集成测试
//!
//! 测试从文件加载配置并构造熔断器

use oknotok::{CircuitBreaker, CircuitState, ConfigError, Settings, SettingsFile};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        ".yaml",
        "name: orders\nmax_requests: 2\ninterval: 1m\ntimeout: 15s\n",
    );

    let settings: Settings<std::io::Error> = SettingsFile::from_path(file.path())
        .unwrap()
        .into_settings()
        .unwrap();
    let breaker = CircuitBreaker::new(settings);

    assert_eq!(breaker.name(), "orders");
    assert_eq!(breaker.settings().max_requests, 2);
    assert_eq!(breaker.settings().interval, Duration::from_secs(60));
    assert_eq!(breaker.settings().timeout, Duration::from_secs(15));
    assert_eq!(breaker.state(), CircuitState::Ok);
}

#[test]
fn test_load_toml_file_with_defaults() {
    let file = write_config(".toml", "name = \"search\"\n");

    let settings: Settings<std::io::Error> = SettingsFile::from_path(file.path())
        .unwrap()
        .into_settings()
        .unwrap();
    let breaker = CircuitBreaker::new(settings);

    assert_eq!(breaker.settings().max_requests, 1);
    assert_eq!(breaker.settings().interval, Duration::ZERO);
    assert_eq!(breaker.settings().timeout, Duration::from_secs(60));
}

#[test]
fn test_load_json_file() {
    let file = write_config(
        ".json",
        r#"{"name": "users", "max_requests": 5, "timeout": "250ms"}"#,
    );

    let loaded = SettingsFile::from_path(file.path()).unwrap();
    assert_eq!(loaded.name, "users");
    assert_eq!(loaded.max_requests, 5);
    assert_eq!(loaded.timeout.as_deref(), Some("250ms"));
}

#[test]
fn test_unsupported_extension() {
    let file = write_config(".ini", "name=x");
    let result = SettingsFile::from_path(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let result = SettingsFile::from_path("/nonexistent/oknotok/breaker.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_yaml() {
    let file = write_config(".yml", "name: [unterminated\n");
    let result = SettingsFile::from_path(file.path());
    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_loaded_settings_accept_custom_strategies() {
    let settings: Settings<std::io::Error> = SettingsFile::from_yaml_str("name: custom\n")
        .unwrap()
        .into_settings()
        .unwrap();
    let breaker = CircuitBreaker::new(settings.ready_to_trip(|stats| stats.failures >= 1));

    let _ = breaker.call(|| Err::<(), _>(std::io::Error::other("down")));
    assert_eq!(breaker.state(), CircuitState::NotOk);
}
