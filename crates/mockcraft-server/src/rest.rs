//! HTTP REST API for Mockcraft.
//!
//! Exposes scanning and synthesis over JSON:
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `GET /health` | | `{status, version}` |
//! | `POST /api/analyze-repo` | `{repoUrl}` or `{file}` | `{success, data: ScanReport}` |
//! | `POST /api/generate-api-schema` | `{scannedRepo}` | `{success, schema}` |
//! | `POST /api/generate-mock-server` | `{scannedRepo, testScenario?}` | `{success, config, code}` |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mockcraft::{
    api_schema, generate_program, FaultProfile, ScanConfig, ScanError, ScanInput, ScanReport,
    ScanResult, Scanner, ServerOptions,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

/// State shared by all REST handlers.
pub struct ApiState {
    scanner: Scanner,
    options: ServerOptions,
}

impl ApiState {
    pub fn new(config: ScanConfig, options: ServerOptions) -> ScanResult<Self> {
        Ok(Self {
            scanner: Scanner::new(config)?,
            options,
        })
    }
}

/// Errors surfaced by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidBody { field: &'static str, reason: String },

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::Scan(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Scan(ScanError::RepositoryUnreachable { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::InvalidBody { .. } => "INVALID_BODY",
            ApiError::Scan(e) => e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("rejected request: {self}");
        }
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze-repo", post(analyze_repo))
        .route("/api/generate-api-schema", post(generate_api_schema))
        .route("/api/generate-mock-server", post(generate_mock_server))
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server on the given port.
pub async fn start(port: u16, state: Arc<ApiState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

fn scanned_repo(body: &Value) -> Result<ScanReport, ApiError> {
    let raw = body
        .get("scannedRepo")
        .filter(|v| !v.is_null())
        .ok_or(ApiError::MissingField("scannedRepo is required"))?;
    serde_json::from_value(raw.clone()).map_err(|e| ApiError::InvalidBody {
        field: "scannedRepo",
        reason: e.to_string(),
    })
}

fn test_scenario(body: &Value) -> Result<FaultProfile, ApiError> {
    match body.get("testScenario") {
        None | Some(Value::Null) => Ok(FaultProfile::none()),
        Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| ApiError::InvalidBody {
            field: "testScenario",
            reason: e.to_string(),
        }),
    }
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze_repo(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let input = if let Some(url) = non_empty_str(&body, "repoUrl") {
        ScanInput::RepositoryUrl(url.to_string())
    } else if let Some(file) = body.get("file").filter(|v| !v.is_null()) {
        let name = file
            .as_str()
            .or_else(|| file.get("name").and_then(Value::as_str))
            .unwrap_or("upload")
            .to_string();
        ScanInput::UploadedFile { name }
    } else {
        return Err(ApiError::MissingField("Either repoUrl or file is required"));
    };

    let report = state.scanner.scan(input).await?;
    Ok(Json(json!({ "success": true, "data": report })))
}

async fn generate_api_schema(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let report = scanned_repo(&body)?;
    Ok(Json(json!({ "success": true, "schema": api_schema(&report) })))
}

async fn generate_mock_server(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let report = scanned_repo(&body)?;
    let fault = test_scenario(&body)?;
    let (config, program) = generate_program(&report.endpoints, fault, state.options);
    Ok(Json(json!({
        "success": true,
        "config": config,
        "code": program.into_string(),
    })))
}
