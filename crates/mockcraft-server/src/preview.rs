//! In-process preview runtime.
//!
//! Hosts a [`MockServerConfig`] directly: the same two middleware stages as
//! the emitted program (latency, then outage), followed by a dispatcher that
//! matches the request path against each route pattern and runs the compiled
//! [`HandlerBehavior`]. Paths are matched by hand rather than registered as
//! axum routes because endpoint paths may carry query strings or template
//! placeholders.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use mockcraft::synth::handler::{method_not_allowed, HandlerResponse};
use mockcraft::synth::{MockServerConfig, RoutePattern};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for one hosted mock server.
pub struct PreviewState {
    config: MockServerConfig,
    patterns: Vec<RoutePattern>,
    rng: Mutex<StdRng>,
}

impl PreviewState {
    pub fn new(config: MockServerConfig, rng: StdRng) -> Self {
        let patterns = config
            .routes
            .iter()
            .map(|route| RoutePattern::parse(&route.path))
            .collect();
        Self {
            config,
            patterns,
            rng: Mutex::new(rng),
        }
    }

    /// Uniform sample in `[0, 1)`.
    fn roll(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen::<f64>()
    }
}

/// Router with an entropy-seeded failure source.
pub fn router(config: MockServerConfig) -> Router {
    router_with_rng(config, StdRng::from_entropy())
}

/// Router with an explicit failure source, for deterministic runs.
pub fn router_with_rng(config: MockServerConfig, rng: StdRng) -> Router {
    let state = Arc::new(PreviewState::new(config, rng));
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Later layers wrap earlier ones: latency runs before outage.
    Router::new()
        .fallback(dispatch)
        .layer(middleware::from_fn_with_state(state.clone(), outage_stage))
        .layer(middleware::from_fn_with_state(state.clone(), latency_stage))
        .layer(cors)
        .with_state(state)
}

/// Bind `127.0.0.1:<port>` and serve until the future is dropped.
pub async fn serve(config: MockServerConfig) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    for route in &config.routes {
        tracing::info!(
            "  {:<6} {}",
            route.method,
            RoutePattern::parse(&route.path)
        );
    }
    if config.fault.has_latency() {
        tracing::info!("simulated latency: {}ms", config.fault.latency_ms());
    }
    if config.fault.error_rate() > 0.0 {
        tracing::info!("simulated error rate: {}%", config.fault.error_rate() * 100.0);
    }

    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("mock server running on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Middleware ──────────────────────────────────────────────────

async fn latency_stage(
    State(state): State<Arc<PreviewState>>,
    request: Request,
    next: Next,
) -> Response {
    let fault = &state.config.fault;
    if fault.has_latency() {
        tokio::time::sleep(Duration::from_millis(fault.latency_ms())).await;
    }
    next.run(request).await
}

async fn outage_stage(
    State(state): State<Arc<PreviewState>>,
    request: Request,
    next: Next,
) -> Response {
    let fault = &state.config.fault;
    if fault.has_outage_stage() && state.roll() < fault.outage_rate() {
        tracing::debug!("simulated outage for {} {}", request.method(), request.uri());
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Service temporarily unavailable",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "simulated": true,
            })),
        )
            .into_response();
    }
    next.run(request).await
}

// ── Dispatch ────────────────────────────────────────────────────

async fn dispatch(State(state): State<Arc<PreviewState>>, method: Method, uri: Uri) -> Response {
    let path = uri.path();
    let mut path_registered = false;

    for (route, pattern) in state.config.routes.iter().zip(&state.patterns) {
        if !pattern.matches(path) {
            continue;
        }
        path_registered = true;
        if route.method.as_str() != method.as_str() {
            continue;
        }

        let behavior = route.behavior;
        if behavior.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(behavior.latency_ms)).await;
        }
        let roll = state.roll();
        return into_response(behavior.respond(method.as_str(), roll, &route.sample_data));
    }

    if path_registered {
        into_response(method_not_allowed())
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
    }
}

fn into_response(response: HandlerResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}
