//! Integration tests for press-core infrastructure

use press_core::{
    config_error, init_logging, storage_error, validation_error, ConsoleConfig, ErrorContext,
    LogFormat, LoggingConfig, PressError, TeamBootstrap,
};

#[test]
fn test_error_handling() {
    let error = storage_error!("Test storage error", "test_component");

    match &error {
        PressError::Storage {
            message, context, ..
        } => {
            assert_eq!(message, "Test storage error");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Storage error"),
    }

    // Should not panic without a subscriber
    error.log();

    let network_error = PressError::Network {
        message: "Connection failed".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert!(network_error.is_transport());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(!config_error.is_transport());

    let validation = validation_error!("bad email", "email", "test");
    match validation {
        PressError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("email")),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_error_context_builder() {
    let context = ErrorContext::new("frappe_client")
        .with_operation("call_method")
        .with_metadata("method", "press.api.account.get_site_count")
        .with_suggestion("Check network connectivity");

    assert_eq!(context.operation.as_deref(), Some("call_method"));
    assert_eq!(
        context.metadata.get("method").map(String::as_str),
        Some("press.api.account.get_site_count")
    );
    assert_eq!(context.recovery_suggestions.len(), 1);
}

#[test]
fn test_config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("press.toml");

    let mut config = ConsoleConfig::default();
    config.server.base_url = "https://cloud.example.com".to_string();
    config.session.bootstrap = TeamBootstrap::new("acme")
        .with_valid_team("globex")
        .with_system_user(false);
    config.session.storage_path = Some(dir.path().join("local_storage.json"));
    config.logging.format = LogFormat::Json;

    config.save_to_file(&path).unwrap();
    let loaded = ConsoleConfig::from_file(&path).unwrap();

    assert_eq!(loaded.server.base_url, "https://cloud.example.com");
    assert_eq!(loaded.session.bootstrap, config.session.bootstrap);
    assert_eq!(loaded.session.storage_path, config.session.storage_path);
    assert_eq!(loaded.logging.format, LogFormat::Json);
}

#[test]
fn test_config_from_handwritten_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("press.toml");
    std::fs::write(
        &path,
        r#"
[server]
base_url = "https://cloud.example.com"
cookie = "sid=abc; user_id=jane%40example.com"

[session]
default_team = "acme"
is_system_user = true
valid_teams = [{ name = "acme" }, { name = "globex" }]
"#,
    )
    .unwrap();

    let config = ConsoleConfig::from_file(&path).unwrap();
    assert_eq!(config.server.timeout_seconds, 30);
    assert_eq!(config.session.bootstrap.default_team, "acme");
    assert_eq!(config.session.bootstrap.valid_teams.len(), 2);
    assert!(config.session.bootstrap.is_system_user);
    assert!(config.session.storage_path.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = ConsoleConfig::default();
    assert!(config.validate().is_ok());

    config.server.base_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(PressError::Config { .. })));

    config.server.base_url = "ftp://cloud.example.com".to_string();
    assert!(matches!(config.validate(), Err(PressError::Config { .. })));

    config.server.base_url = "https://cloud.example.com".to_string();
    config.server.timeout_seconds = 0;
    assert!(matches!(config.validate(), Err(PressError::Config { .. })));

    config.server.timeout_seconds = 10;
    config.session.bootstrap = TeamBootstrap::new("acme").with_valid_team(" ");
    assert!(matches!(
        config.validate(),
        Err(PressError::Validation { .. })
    ));
}

#[test]
fn test_missing_config_file() {
    let result = ConsoleConfig::from_file("/definitely/not/here/press.toml");
    assert!(matches!(result, Err(PressError::Config { .. })));
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["press_core=debug".to_string()],
        ..Default::default()
    };

    // A global subscriber can only be installed once per process
    let first = init_logging(&config);
    assert!(first.is_ok());
    assert!(init_logging(&config).is_err());
}
