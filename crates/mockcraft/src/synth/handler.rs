//! Route handler compilation.
//!
//! A [`RouteHandler`] carries both a structured [`HandlerBehavior`] (what the
//! handler does when executed) and the emitted handler source. The behavior is
//! what hosts execute and tests assert on; the source is derived from it.

use crate::fault::FaultProfile;
use crate::synth::schema::{expand_for_pagination, synthesize};
use crate::types::{Endpoint, HttpMethod};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sequence length used when pagination stress is enabled.
pub const PAGINATION_STRESS_ITEMS: usize = 100;

/// What a compiled handler does at request time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerBehavior {
    pub method: HttpMethod,
    /// Delay before responding.
    pub latency_ms: u64,
    /// Probability of a 500 random failure.
    pub failure_rate: f64,
}

/// Status and JSON body a handler answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerBehavior {
    /// Decide the response for a request.
    ///
    /// `roll` is a uniform sample in `[0, 1)`; the request fails when
    /// `roll < failure_rate`. A method that is not one of the five supported
    /// ones, or differs from the declared one, gets 405.
    pub fn respond(&self, request_method: &str, roll: f64, sample: &Value) -> HandlerResponse {
        if self.failure_rate > 0.0 && roll < self.failure_rate {
            return HandlerResponse {
                status: 500,
                body: json!({ "error": "Random failure" }),
            };
        }
        match request_method.parse::<HttpMethod>() {
            Ok(method) if method == self.method => HandlerResponse {
                status: 200,
                body: sample.clone(),
            },
            _ => method_not_allowed(),
        }
    }
}

/// The 405 response shared by handlers and per-path guards.
pub fn method_not_allowed() -> HandlerResponse {
    HandlerResponse {
        status: 405,
        body: json!({ "error": "Method not allowed" }),
    }
}

/// Compiled behavior for one endpoint. Never mutated after compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHandler {
    pub method: HttpMethod,
    pub path: String,
    pub sample_data: Value,
    pub behavior: HandlerBehavior,
    /// Emitted handler source (an Express `async (req, res) => { ... }`).
    #[serde(rename = "handler")]
    pub body_text: String,
}

/// Compile one endpoint with its sample payload under a fault profile.
pub fn compile(endpoint: &Endpoint, sample: Value, fault: &FaultProfile) -> RouteHandler {
    let sample = if fault.pagination_stress() {
        expand_for_pagination(sample, PAGINATION_STRESS_ITEMS)
    } else {
        sample
    };
    let behavior = HandlerBehavior {
        method: endpoint.method,
        latency_ms: fault.latency_ms(),
        failure_rate: fault.error_rate(),
    };
    let body_text = render_handler(&behavior, &sample);

    RouteHandler {
        method: endpoint.method,
        path: endpoint.path.clone(),
        sample_data: sample,
        behavior,
        body_text,
    }
}

/// Synthesize a sample for every endpoint and compile it, preserving order.
pub fn compile_all(endpoints: &[Endpoint], fault: &FaultProfile) -> Vec<RouteHandler> {
    endpoints
        .iter()
        .map(|endpoint| {
            let sample = synthesize(endpoint.response_schema.as_ref(), Some(&endpoint.path));
            compile(endpoint, sample, fault)
        })
        .collect()
}

fn render_handler(behavior: &HandlerBehavior, sample: &Value) -> String {
    let mut out = String::from("async (req, res) => {\n");

    if behavior.latency_ms > 0 {
        out.push_str(&format!(
            "  await new Promise((resolve) => setTimeout(resolve, {}));\n",
            behavior.latency_ms
        ));
    }
    if behavior.failure_rate > 0.0 {
        out.push_str(&format!(
            "  if (Math.random() < {}) {{\n    return res.status(500).json({{ error: 'Random failure' }});\n  }}\n",
            behavior.failure_rate
        ));
    }

    let payload = serde_json::to_string_pretty(sample).unwrap_or_else(|_| "{}".to_string());
    let payload = payload.replace('\n', "\n    ");
    out.push_str(&format!(
        "  if (req.method === '{}') {{\n    res.json({payload});\n  }} else {{\n    res.status(405).json({{ error: 'Method not allowed' }});\n  }}\n}}",
        behavior.method
    ));
    out
}
