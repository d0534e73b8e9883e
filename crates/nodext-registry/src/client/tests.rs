//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.registry(), "https://registry.npmjs.org/");
    assert_eq!(client.retry_config.max_retries, 3);
}

#[tokio::test]
async fn test_registry_client_sends_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "private",
            "dist-tags": { "latest": "1.0.0" },
            "versions": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = AuthConfig {
        token: Some("test-token".to_string()),
        ..AuthConfig::default()
    };
    let client = RegistryClient::with_config(&mock_server.uri(), Some(auth), RetryConfig::none()).unwrap();

    assert!(client.fetch_metadata("private").await.is_ok());
}

#[test]
fn test_invalid_registry_url() {
    assert!(matches!(
        RegistryClient::with_registry("not a url"),
        Err(NodextError::ConfigValidation { .. })
    ));
}

#[test]
fn test_authorization_value() {
    let basic = authorization_value(AuthConfig {
        token: None,
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
    });
    assert_eq!(basic.as_deref(), Some("Basic dXNlcjpwYXNz"));
    assert!(authorization_value(AuthConfig::default()).is_none());
}

#[tokio::test]
async fn test_encode_package_name() {
    let client = RegistryClient::new().unwrap();

    // Regular package
    assert_eq!(client.encode_package_name("lodash"), "lodash");

    // Scoped package
    assert_eq!(client.encode_package_name("@types/node"), "@types%2fnode");
}

#[tokio::test]
async fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
    assert_eq!(RetryConfig::none().max_retries, 0);
}

#[tokio::test]
async fn test_fetch_metadata_success() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "name": "test-package",
        "dist-tags": {
            "latest": "1.0.0"
        },
        "versions": {
            "1.0.0": {
                "version": "1.0.0",
                "dependencies": { "left-pad": "^1.3.0" },
                "dist": {
                    "tarball": "https://registry.npmjs.org/test-package/-/test-package-1.0.0.tgz",
                    "shasum": "abc123"
                }
            }
        }
    });

    Mock::given(method("GET"))
        .and(path("/test-package"))
        .and(header("Accept", "application/vnd.npm.install-v1+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::with_registry(&mock_server.uri()).unwrap();

    let metadata = client.fetch_metadata("test-package").await.unwrap();
    assert_eq!(metadata.name, "test-package");
    assert_eq!(metadata.versions.len(), 1);
}

#[tokio::test]
async fn test_fetch_full_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test-package"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "test-package",
            "dist-tags": { "latest": "1.0.0" },
            "versions": {
                "1.0.0": { "version": "1.0.0", "devDependencies": { "jest": "^29.0.0" } }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RegistryClient::with_registry(&mock_server.uri()).unwrap();

    let metadata = client.fetch_full_metadata("test-package").await.unwrap();
    let dev = metadata.versions["1.0.0"].dev_dependencies.as_ref().unwrap();
    assert!(dev.contains_key("jest"));
}

#[tokio::test]
async fn test_fetch_metadata_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nonexistent-package"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RegistryClient::with_registry(&mock_server.uri()).unwrap();

    let result = client.fetch_metadata("nonexistent-package").await;
    match result.unwrap_err() {
        NodextError::PackageNotFound { name } => {
            assert_eq!(name, "nonexistent-package");
        },
        other => panic!("Expected PackageNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let retry = RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    };
    let client = RegistryClient::with_registry(&mock_server.uri())
        .unwrap()
        .retry_config(retry);

    let result = client.fetch_metadata("flaky").await;
    assert!(matches!(result, Err(NodextError::Registry { status: 503, .. })));
}

fn retrying_client(mock_server: &MockServer) -> RegistryClient {
    let retry = RetryConfig {
        max_retries: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    };
    RegistryClient::with_registry(&mock_server.uri())
        .unwrap()
        .retry_config(retry)
}

#[tokio::test]
async fn test_rejected_credentials_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let result = retrying_client(&mock_server).fetch_metadata("private").await;
    match result.unwrap_err() {
        NodextError::Registry { name, status } => {
            assert_eq!(name, "private");
            assert_eq!(status, 401);
        },
        other => panic!("Expected Registry error, got {:?}", other),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_document_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = retrying_client(&mock_server).fetch_metadata("bad").await;
    match result.unwrap_err() {
        NodextError::JsonParse { path, .. } => assert!(path.ends_with("/bad")),
        other => panic!("Expected JsonParse error, got {:?}", other),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scoped_package_url_encoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/@types%2fnode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "@types/node",
            "dist-tags": { "latest": "1.0.0" },
            "versions": {}
        })))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::with_registry(&mock_server.uri()).unwrap();

    let result = client.fetch_metadata("@types/node").await;
    assert!(result.is_ok());
}
