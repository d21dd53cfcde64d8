//! Integration tests for the ESC HTTP client.
//!
//! A wiremock server stands in for the ESC API so request shapes, status mapping and the full
//! provider flow can be checked without network access.

mod common;

use common::{document, environment, ENVIRONMENT, ORGANIZATION};
use esc_secrets::esc::{
    ApiError, EnvironmentApi, EnvironmentDefinition, HttpEnvironmentApi, PropertyValue,
};
use esc_secrets::secrets::{
    EscSecretsClient, PushSecretData, RemoteRef, Secret, SecretString, SecretsClient, SecretsError,
};
use esc_secrets::EscProviderConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "pul-test-token";

fn env_path(tail: &str) -> String {
    format!("/api/esc/environments/{}/{}{}", ORGANIZATION, ENVIRONMENT, tail)
}

fn http_api(server: &MockServer) -> HttpEnvironmentApi {
    HttpEnvironmentApi::new(
        &format!("{}/api/esc", server.uri()),
        SecretString::new(TOKEN),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn provider(server: &MockServer) -> EscSecretsClient {
    let mut config = EscProviderConfig::new(ORGANIZATION, ENVIRONMENT, TOKEN);
    config.api_url = format!("{}/api/esc", server.uri());
    config.timeout_seconds = 5;
    EscSecretsClient::from_config(&config).unwrap()
}

async fn mount_open(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path(env_path("/open")))
        .and(query_param("duration", "2h"))
        .and(header("authorization", format!("token {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id, "diagnostics": []})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_open_environment_request_shape() {
    let server = MockServer::start().await;
    mount_open(&server, "open-1").await;

    let opened = http_api(&server).open_environment(&environment()).await.unwrap();
    assert_eq!(opened.id, "open-1");
    assert!(opened.diagnostics.is_empty());
}

#[tokio::test]
async fn test_read_property_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("/open/open-1")))
        .and(query_param("property", "db.password"))
        .and(header("authorization", format!("token {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "s3cret",
            "secret": true,
            "trace": {"def": {"environment": ENVIRONMENT}}
        })))
        .mount(&server)
        .await;

    let value = http_api(&server)
        .read_environment_property(&environment(), "open-1", "db.password")
        .await
        .unwrap();
    assert!(value.secret);
    assert_eq!(value.value, PropertyValue::from("s3cret"));
}

#[tokio::test]
async fn test_open_and_read_strips_wrappers() {
    let server = MockServer::start().await;
    mount_open(&server, "open-2").await;
    Mock::given(method("GET"))
        .and(path(env_path("/open/open-2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {
                "db": {"value": {"user": {"value": "svc", "trace": {}}, "port": {"value": 5432}}},
                "region": {"value": "eu-west-1"}
            }
        })))
        .mount(&server)
        .await;

    let (opened, doc) = http_api(&server).open_and_read_environment(&environment()).await.unwrap();
    assert_eq!(opened.id, "open-2");
    assert_eq!(doc, document(json!({"db": {"user": "svc", "port": 5432}, "region": "eu-west-1"})));
}

#[tokio::test]
async fn test_update_environment_sends_yaml() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(env_path("")))
        .and(header("content-type", "application/x-yaml"))
        .and(header("authorization", format!("token {}", TOKEN).as_str()))
        .and(body_string_contains("values:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "diagnostics": [{"summary": "unused import", "path": "imports[0]"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let definition = EnvironmentDefinition::new(document(json!({"db": {"password": "p"}})));
    let diagnostics =
        http_api(&server).update_environment(&environment(), &definition).await.unwrap();
    assert_eq!(diagnostics.diagnostics.len(), 1);
    assert_eq!(diagnostics.diagnostics[0].summary, "unused import");

    let requests = server.received_requests().await.unwrap();
    let sent: EnvironmentDefinition = serde_yaml::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, definition);
}

#[tokio::test]
async fn test_update_environment_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(env_path("")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let definition = EnvironmentDefinition::default();
    let diagnostics =
        http_api(&server).update_environment(&environment(), &definition).await.unwrap();
    assert!(diagnostics.diagnostics.is_empty());
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/esc/environments/acme/forbidden/open"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/esc/environments/acme/missing/open"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/esc/environments/acme/broken/open"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"code": 500, "message": "internal"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/esc/environments/acme/garbled/open"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let api = http_api(&server);
    let env = |name: &str| esc_secrets::esc::EnvironmentRef::new("acme", name);

    let err = api.open_environment(&env("forbidden")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 403 }));

    let err = api.open_environment(&env("missing")).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    let err = api.open_environment(&env("broken")).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = api.open_environment(&env("garbled")).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unauthorized_error_does_not_leak_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = provider(&server).get_secret(&RemoteRef::new("k")).await.unwrap_err();
    assert!(matches!(err, SecretsError::Api(ApiError::Unauthorized { status: 401 })));
    assert!(!err.to_string().contains(TOKEN));
    assert!(!format!("{:?}", err).contains(TOKEN));
}

#[tokio::test]
async fn test_provider_get_secret_map_over_http() {
    let server = MockServer::start().await;
    mount_open(&server, "open-3").await;
    Mock::given(method("GET"))
        .and(path(env_path("/open/open-3")))
        .and(query_param("property", "stripe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": {
                "api_key": {"value": "sk_live", "secret": true},
                "retries": {"value": 3}
            }
        })))
        .mount(&server)
        .await;

    let secrets = provider(&server).get_secret_map(&RemoteRef::new("stripe")).await.unwrap();
    assert_eq!(secrets.len(), 2);
    assert_eq!(secrets["api_key"], b"sk_live".to_vec());
    assert_eq!(secrets["retries"], b"3".to_vec());
}

#[tokio::test]
async fn test_provider_push_secret_over_http() {
    let server = MockServer::start().await;
    mount_open(&server, "open-4").await;
    Mock::given(method("GET"))
        .and(path(env_path("/open/open-4")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {"db": {"value": {"user": {"value": "svc"}}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(env_path("")))
        .respond_with(|_: &Request| ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let secret = Secret::new("db-creds").with_data("password", "hunter2");
    provider(&server)
        .push_secret(&secret, &PushSecretData::new("password", "db.password"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let patch = requests.iter().find(|r| r.method.as_str() == "PATCH").unwrap();
    let sent: EnvironmentDefinition = serde_yaml::from_slice(&patch.body).unwrap();
    assert_eq!(sent.values, document(json!({"db": {"user": "svc", "password": "hunter2"}})));
}

#[tokio::test]
async fn test_provider_push_secret_update_failure() {
    let server = MockServer::start().await;
    mount_open(&server, "open-5").await;
    Mock::given(method("GET"))
        .and(path(env_path("/open/open-5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(env_path("")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "conflict"})))
        .mount(&server)
        .await;

    let secret = Secret::new("s").with_data("k", "v");
    let err = provider(&server)
        .push_secret(&secret, &PushSecretData::new("k", "k"))
        .await
        .unwrap_err();
    assert!(matches!(err, SecretsError::PushSecret(ApiError::Status { status: 409, .. })));
    assert_eq!(err.to_string(), "error pushing secret: ESC API returned status 409: conflict");
}
