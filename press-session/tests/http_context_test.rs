//! TeamContext wired from configuration against a mock press server

use press_core::{ConsoleConfig, TeamBootstrap};
use press_session::{global, FileStore, KeyValueStore, RecordingNavigator, SwitchOutcome, TeamContext};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, storage: &Path) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.server.base_url = server.uri();
    config.server.timeout_seconds = 5;
    config.server.cookie = Some("sid=abc123; user_id=jane%40example.com".to_string());
    config.session.bootstrap = TeamBootstrap::new("acme")
        .with_valid_team("acme")
        .with_valid_team("globex");
    config.session.storage_path = Some(storage.to_path_buf());
    config
}

#[tokio::test]
async fn test_switch_over_http_persists_to_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("local_storage.json");

    Mock::given(method("POST"))
        .and(path("/api/method/press.api.account.can_switch_to_team"))
        .and(body_json(json!({ "team": "globex" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": true })))
        .expect(1)
        .mount(&server)
        .await;

    let navigator = Arc::new(RecordingNavigator::new());
    let context = TeamContext::from_config(&config_for(&server, &storage), navigator.clone()).unwrap();

    assert_eq!(context.get_current_team().as_deref(), Some("acme"));
    assert_eq!(
        context.switch_to_team("globex").await.unwrap(),
        SwitchOutcome::Switched
    );
    assert_eq!(navigator.reload_count(), 1);

    // A fresh session sees the stored choice
    let reopened = FileStore::new(&storage);
    assert_eq!(
        reopened.get("current_team").unwrap().as_deref(),
        Some("globex")
    );
    let next = TeamContext::from_config(&config_for(&server, &storage), navigator.clone()).unwrap();
    assert_eq!(next.get_team().name(), Some("globex"));
}

#[tokio::test]
async fn test_server_error_during_switch_is_denied() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("local_storage.json");

    Mock::given(method("POST"))
        .and(path("/api/method/press.api.account.can_switch_to_team"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let navigator = Arc::new(RecordingNavigator::new());
    let context = TeamContext::from_config(&config_for(&server, &storage), navigator.clone()).unwrap();
    context.get_current_team();

    assert_eq!(
        context.switch_to_team("globex").await.unwrap(),
        SwitchOutcome::Denied
    );
    assert_eq!(navigator.reload_count(), 0);
    assert_eq!(
        FileStore::new(&storage).get("current_team").unwrap().as_deref(),
        Some("acme")
    );
}

#[tokio::test]
async fn test_members_and_site_count_over_http() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("local_storage.json");

    Mock::given(method("POST"))
        .and(path("/api/method/run_doc_method"))
        .and(body_json(json!({
            "dt": "Team",
            "dn": "acme",
            "method": "get_team_members",
            "args": "{}",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": [{ "name": "jane@example.com", "first_name": "Jane" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/method/press.api.account.get_site_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": 1 })))
        .mount(&server)
        .await;

    let context = TeamContext::from_config(
        &config_for(&server, &storage),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();

    let members = context.get_team().get_team_members().await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "jane@example.com");

    assert!(context.is_last_site("acme").await.unwrap());
}

#[tokio::test]
async fn test_global_switch_to_team() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("local_storage.json");

    assert!(global::switch_to_team("globex").await.is_err());

    Mock::given(method("POST"))
        .and(path("/api/method/press.api.account.can_switch_to_team"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": false })))
        .mount(&server)
        .await;

    let navigator = Arc::new(RecordingNavigator::new());
    let context = Arc::new(
        TeamContext::from_config(&config_for(&server, &storage), navigator.clone()).unwrap(),
    );

    assert!(global::install(context.clone()));
    assert!(!global::install(context));
    assert!(global::installed().is_some());

    assert_eq!(
        global::switch_to_team("globex").await.unwrap(),
        SwitchOutcome::Denied
    );
    assert_eq!(navigator.reload_count(), 0);
}
