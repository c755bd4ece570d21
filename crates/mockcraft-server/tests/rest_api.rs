//! REST API tests against a mocked hosting provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mockcraft::{ScanConfig, ServerOptions};
use mockcraft_server::rest::{router, ApiState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────── helpers ───────────────────────

fn app_for(base: &str) -> Router {
    let mut config = ScanConfig::default().with_base_url(base);
    config.max_retries = 0;
    config.request_timeout_ms = 2_000;
    router(Arc::new(ApiState::new(config, ServerOptions::default()).unwrap()))
}

/// An app whose scanner points at an address that is never contacted.
fn offline_app() -> Router {
    app_for("http://127.0.0.1:9")
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn mock_repo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/acme/web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "web",
            "default_branch": "main"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/git/trees/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tree": [{"path": "src/api.ts", "type": "blob"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/acme/web/main/src/api.ts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("fetch('/api/users');\naxios.post('/api/users', body);"),
        )
        .mount(server)
        .await;
}

fn scanned_repo() -> Value {
    json!({
        "endpoints": [
            {"method": "GET", "path": "/api/users", "responseSchema": {"id": "id", "name": "name"}},
            {"method": "POST", "path": "/v1/upload"}
        ],
        "interfaces": [
            {"name": "User", "kind": "interface", "bodyText": "\n  id: string;"}
        ],
        "fetchCalls": [],
        "axiosCalls": []
    })
}

// ─────────────────────── health ───────────────────────

#[tokio::test]
async fn test_health() {
    let (status, body) = send(offline_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ─────────────────────── analyze-repo ───────────────────────

#[tokio::test]
async fn test_analyze_repo() {
    let server = MockServer::start().await;
    mock_repo(&server).await;

    let (status, body) = send(
        app_for(&server.uri()),
        "POST",
        "/api/analyze-repo",
        Some(json!({"repoUrl": "https://github.com/acme/web"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let endpoints = body["data"]["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0], json!({"method": "GET", "path": "/api/users"}));
    assert_eq!(endpoints[1]["method"], "POST");
    assert_eq!(body["data"]["repoMetadata"]["name"], "web");
}

#[tokio::test]
async fn test_analyze_repo_requires_input() {
    let (status, body) = send(offline_app(), "POST", "/api/analyze-repo", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(body["error"], "Either repoUrl or file is required");
}

#[tokio::test]
async fn test_analyze_repo_rejects_uploaded_file() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/analyze-repo",
        Some(json!({"file": "frontend.zip"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_INPUT_KIND");
}

#[tokio::test]
async fn test_analyze_repo_rejects_bad_reference() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/analyze-repo",
        Some(json!({"repoUrl": "https://gitlab.com/acme/web"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REPOSITORY_REFERENCE");
}

#[tokio::test]
async fn test_analyze_repo_unreachable_is_bad_gateway() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app_for(&server.uri()),
        "POST",
        "/api/analyze-repo",
        Some(json!({"repoUrl": "acme/web"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "REPOSITORY_UNREACHABLE");
}

// ─────────────────────── synthesis ───────────────────────

#[tokio::test]
async fn test_generate_api_schema() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-api-schema",
        Some(json!({"scannedRepo": scanned_repo()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schema"]["version"], "1.0.0");
    assert_eq!(body["schema"]["endpoints"].as_array().unwrap().len(), 2);
    assert_eq!(body["schema"]["interfaces"][0]["name"], "User");
}

#[tokio::test]
async fn test_generate_api_schema_requires_scanned_repo() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-api-schema",
        Some(json!({"scannedRepo": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "scannedRepo is required");
}

#[tokio::test]
async fn test_generate_mock_server_with_scenario() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-mock-server",
        Some(json!({
            "scannedRepo": scanned_repo(),
            "testScenario": {"latency": 200, "errorRate": 0.1, "serverOutage": false}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let config = &body["config"];
    assert_eq!(config["port"], 3001);
    assert_eq!(config["latencyMs"], 200);
    assert_eq!(config["errorRate"], 0.1);
    assert_eq!(
        config["routes"][0]["sampleData"],
        json!({"id": "123e4567-e89b-12d3-a456-426614174000", "name": "John Doe"})
    );
    assert_eq!(config["routes"][1]["sampleData"]["status"], "success");

    let code = body["code"].as_str().unwrap();
    assert!(code.contains("const LATENCY_MS = 200;"));
    assert!(code.contains("const ERROR_RATE = 0.1;"));
    assert!(code.contains("app.get('/api/users'"));
    assert!(code.contains("app.post('/v1/upload'"));
}

#[tokio::test]
async fn test_generate_mock_server_clamps_scenario() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-mock-server",
        Some(json!({
            "scannedRepo": scanned_repo(),
            "testScenario": {"latency": -50, "errorRate": 4}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["latencyMs"], 0);
    assert_eq!(body["config"]["errorRate"], 1.0);
}

#[tokio::test]
async fn test_generate_mock_server_rejects_malformed_repo() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-mock-server",
        Some(json!({"scannedRepo": {"endpoints": [{"method": "TRACE", "path": "/x"}]}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_generate_mock_server_honours_random_failures_off() {
    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-mock-server",
        Some(json!({
            "scannedRepo": scanned_repo(),
            "testScenario": {
                "latency": 0,
                "serverOutage": false,
                "randomFailures": false,
                "failureRate": 0.1
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["errorRate"], 0.0);
    assert_eq!(body["config"]["routes"][0]["behavior"]["failureRate"], 0.0);
    let code = body["code"].as_str().unwrap();
    assert!(code.contains("const ERROR_RATE = 0;"));
    assert!(!code.contains("// Simulated outage"));
}

#[tokio::test]
async fn test_synthesis_accepts_definition_form_interfaces() {
    let repo = json!({
        "endpoints": [{"method": "GET", "path": "/api/users"}],
        "interfaces": [
            {"name": "User", "definition": "interface User {\n  id: string;\n}"}
        ]
    });

    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-api-schema",
        Some(json!({"scannedRepo": repo.clone()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schema"]["interfaces"][0]["name"], "User");
    assert_eq!(
        body["schema"]["interfaces"][0]["definition"],
        "interface User {\n  id: string;\n}"
    );

    let (status, body) = send(
        offline_app(),
        "POST",
        "/api/generate-mock-server",
        Some(json!({"scannedRepo": repo})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["code"].as_str().unwrap().contains("app.get('/api/users'"));
}
