use mygeotab_rs::config::{Config, MyGeotabConfig};
use mygeotab_rs::{Error, MyGeotabClient};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_config_new_with_valid_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let config_content = r#"
[mygeotab]
username = "test_user"
password = "test_pass"
database = "test_db"
server = "my23.geotab.com"
timeout_secs = 30
"#;

    fs::write(&config_path, config_content).unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let result = Config::new();

    std::env::set_current_dir(original_dir).unwrap();

    assert!(result.is_ok());
    let config = result.unwrap();
    assert_eq!(config.mygeotab.username, "test_user");
    assert_eq!(config.mygeotab.password.as_deref(), Some("test_pass"));
    assert_eq!(config.mygeotab.database.as_deref(), Some("test_db"));
    assert_eq!(config.mygeotab.server.as_deref(), Some("my23.geotab.com"));
    assert_eq!(config.mygeotab.timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn test_config_from_missing_file() {
    let dir = tempdir().unwrap();

    let result = Config::from_file(dir.path().join("config.toml"));

    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_config_with_invalid_toml() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let invalid_content = r#"
[mygeotab
username = "test_user"
"#;

    fs::write(&config_path, invalid_content).unwrap();

    let result = Config::from_file(&config_path);

    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_config_with_missing_username() {
    let result = Config::from_toml(
        r#"
[mygeotab]
password = "test_pass"
"#,
    );

    assert!(result.is_err());
}

#[test]
fn test_config_without_secret_is_a_configuration_error() {
    let config = Config::from_toml(
        r#"
[mygeotab]
username = "test_user"
database = "test_db"
"#,
    )
    .unwrap();

    assert!(matches!(
        config.mygeotab.credentials(),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        MyGeotabClient::from_config(&config),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_config_with_session_builds_client() {
    let config = Config::from_toml(
        r#"
[mygeotab]
username = "test_user"
session_id = "abc123"
database = "test_db"
"#,
    )
    .unwrap();

    let client = MyGeotabClient::from_config(&config).unwrap();
    let credentials = client.credentials();

    assert!(credentials.is_authenticated());
    assert_eq!(credentials.server(), "my.geotab.com");
    assert_eq!(client.api_url(), "https://my.geotab.com/apiv1");
    assert_eq!(config.mygeotab.timeout(), None);
}

#[test]
fn test_config_debug_redacts_secrets() {
    let config = MyGeotabConfig {
        username: "user".to_string(),
        password: Some("hunter2-Qx9".to_string()),
        database: None,
        session_id: Some("sess-7f3e91".to_string()),
        server: None,
        timeout_secs: None,
    };

    let cloned = config.clone();
    let output = format!("{cloned:?}");
    assert!(output.contains("user"));
    assert!(!output.contains("hunter2-Qx9"));
    assert!(!output.contains("sess-7f3e91"));
    assert!(output.contains("[REDACTED]"));
}
