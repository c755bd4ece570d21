//! Mock server program emission.
//!
//! Produces a standalone Express program from compiled route handlers and a
//! fault profile. Routes are registered in endpoint order, followed by one
//! catch-all per distinct path answering 405 for unmatched methods.

use crate::config::ServerOptions;
use crate::fault::FaultProfile;
use crate::synth::handler::RouteHandler;
use crate::synth::route::RoutePattern;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Everything needed to emit or host a mock server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockServerConfig {
    pub routes: Vec<RouteHandler>,
    pub port: u16,
    #[serde(flatten)]
    pub fault: FaultProfile,
}

impl MockServerConfig {
    pub fn new(routes: Vec<RouteHandler>, fault: FaultProfile, options: ServerOptions) -> Self {
        Self {
            routes,
            port: options.port,
            fault,
        }
    }
}

/// Emitted server source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProgram(String);

impl ServerProgram {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ServerProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Emit a program for `routes` on the default port.
pub fn emit(routes: Vec<RouteHandler>, fault: FaultProfile) -> ServerProgram {
    render(&MockServerConfig::new(
        routes,
        fault,
        ServerOptions::default(),
    ))
}

/// Render the full server program for a configuration.
pub fn render(config: &MockServerConfig) -> ServerProgram {
    let fault = &config.fault;
    let mut out = String::with_capacity(4096);

    out.push_str("// Generated mock server\n");
    out.push_str("const express = require('express');\n");
    out.push_str("const cors = require('cors');\n\n");
    out.push_str("const app = express();\n");
    out.push_str(&format!("const PORT = process.env.PORT || {};\n", config.port));
    out.push_str(&format!("const LATENCY_MS = {};\n", fault.latency_ms()));
    out.push_str(&format!("const ERROR_RATE = {};\n", fault.error_rate()));
    out.push_str(&format!("const SERVER_OUTAGE = {};\n\n", fault.outage()));
    out.push_str("app.use(cors());\n");
    out.push_str("app.use(express.json());\n\n");

    if fault.has_latency() {
        out.push_str("// Simulated latency\n");
        out.push_str("app.use(async (req, res, next) => {\n");
        out.push_str("  await new Promise((resolve) => setTimeout(resolve, LATENCY_MS));\n");
        out.push_str("  next();\n");
        out.push_str("});\n\n");
    }

    if fault.has_outage_stage() {
        out.push_str("// Simulated outage\n");
        out.push_str("app.use((req, res, next) => {\n");
        out.push_str("  if (SERVER_OUTAGE || Math.random() < ERROR_RATE) {\n");
        out.push_str("    return res.status(503).json({\n");
        out.push_str("      error: 'Service temporarily unavailable',\n");
        out.push_str("      timestamp: new Date().toISOString(),\n");
        out.push_str("      simulated: true,\n");
        out.push_str("    });\n");
        out.push_str("  }\n");
        out.push_str("  next();\n");
        out.push_str("});\n\n");
    }

    let mut express_paths: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for route in &config.routes {
        let express_path = RoutePattern::parse(&route.path).to_express();
        out.push_str(&format!("// {} {}\n", route.method, js_escape(&route.path)));
        out.push_str(&format!(
            "app.{}('{}', {});\n\n",
            route.method.verb(),
            js_escape(&express_path),
            route.body_text
        ));
        if seen.insert(express_path.clone()) {
            express_paths.push(express_path);
        }
    }

    for path in &express_paths {
        out.push_str(&format!(
            "app.all('{}', (req, res) => {{\n  res.status(405).json({{ error: 'Method not allowed' }});\n}});\n\n",
            js_escape(path)
        ));
    }

    out.push_str("app.listen(PORT, () => {\n");
    out.push_str("  console.log(`Mock server running on http://localhost:${PORT}`);\n");
    if fault.has_latency() {
        out.push_str("  console.log(`Simulated latency: ${LATENCY_MS}ms`);\n");
    }
    if fault.error_rate() > 0.0 {
        out.push_str("  console.log(`Simulated error rate: ${ERROR_RATE * 100}%`);\n");
    }
    out.push_str("});\n");

    ServerProgram(out)
}

/// Escape a value for a single-quoted JS string literal or a line comment.
///
/// Line terminators are escaped so scanned text can never start a new line.
fn js_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::extract::extract;
    use crate::scanner::reduce::reduce;
    use crate::synth::handler::compile_all;
    use crate::types::{Endpoint, HttpMethod};

    fn endpoints() -> Vec<Endpoint> {
        vec![
            Endpoint::new(HttpMethod::Get, "/api/users"),
            Endpoint::new(HttpMethod::Post, "/api/users"),
            Endpoint::new(HttpMethod::Delete, "/api/users/${id}"),
        ]
    }

    fn program(fault: FaultProfile) -> String {
        emit(compile_all(&endpoints(), &fault), fault).into_string()
    }

    #[test]
    fn test_one_registration_per_endpoint_in_order() {
        let text = program(FaultProfile::none());
        let get = text.find("app.get('/api/users'").unwrap();
        let post = text.find("app.post('/api/users'").unwrap();
        let delete = text.find("app.delete('/api/users/:id'").unwrap();
        assert!(get < post && post < delete);
        assert_eq!(text.matches("app.get(").count(), 1);
        assert_eq!(text.matches("app.post(").count(), 1);
        assert_eq!(text.matches("app.delete(").count(), 1);
    }

    #[test]
    fn test_catch_all_per_distinct_path() {
        let text = program(FaultProfile::none());
        assert_eq!(text.matches("app.all('/api/users',").count(), 1);
        assert_eq!(text.matches("app.all('/api/users/:id',").count(), 1);
        let last_route = text.find("app.delete(").unwrap();
        assert!(text.find("app.all(").unwrap() > last_route);
    }

    #[test]
    fn test_constants_verbatim() {
        let fault = FaultProfile::clamped(250.0, 0.1);
        let text = program(fault);
        assert!(text.contains("const PORT = process.env.PORT || 3001;"));
        assert!(text.contains("const LATENCY_MS = 250;"));
        assert!(text.contains("const ERROR_RATE = 0.1;"));
        assert!(text.contains("const SERVER_OUTAGE = false;"));
        assert!(text.contains("Simulated latency: ${LATENCY_MS}ms"));
    }

    #[test]
    fn test_quiet_profile_has_no_fault_stages() {
        let text = program(FaultProfile::none());
        assert!(!text.contains("// Simulated latency"));
        assert!(!text.contains("// Simulated outage"));
        assert!(!text.contains("Service temporarily unavailable"));
        assert!(text.contains("app.listen(PORT"));
    }

    #[test]
    fn test_outage_stage() {
        let text = program(FaultProfile::none().with_outage(true));
        assert!(text.contains("const SERVER_OUTAGE = true;"));
        assert!(text.contains("res.status(503)"));
        assert!(text.contains("simulated: true"));
    }

    #[test]
    fn test_empty_endpoint_set_still_emits_a_server() {
        let text = emit(Vec::new(), FaultProfile::none()).into_string();
        assert!(text.contains("const app = express();"));
        assert!(!text.contains("app.all("));
        assert!(text.contains("app.listen(PORT"));
    }

    #[test]
    fn test_paths_are_escaped() {
        assert_eq!(js_escape("/a'b\\c"), "/a\\'b\\\\c");
    }

    #[test]
    fn test_line_terminators_are_escaped() {
        assert_eq!(js_escape("/a\nb\r\u{2028}\u{2029}"), "/a\\nb\\r\\u2028\\u2029");
    }

    #[test]
    fn test_multi_line_url_cannot_inject_statements() {
        let extraction = extract("fetch(`/api/a\nprocess.exit(1)`)", "src/evil.ts");
        let endpoints = reduce(&extraction.fetch_calls);
        assert_eq!(endpoints.len(), 1);
        let fault = FaultProfile::none();
        let text = emit(compile_all(&endpoints, &fault), fault).into_string();

        assert!(text.lines().all(|l| !l.starts_with("process.exit")));
        assert!(text.contains("// GET /api/a\\nprocess.exit(1)\n"));
        assert!(text.contains("app.get('/api/a\\nprocess.exit(1)', async (req, res) => {"));
        assert!(text.contains("app.all('/api/a\\nprocess.exit(1)', (req, res) => {"));
    }

    #[test]
    fn test_config_serializes_flat() {
        let fault = FaultProfile::clamped(10.0, 0.5).with_outage(true);
        let config = MockServerConfig::new(Vec::new(), fault, ServerOptions { port: 4000 });
        let v = serde_json::to_value(&config).unwrap();
        assert_eq!(v["port"], 4000);
        assert_eq!(v["latencyMs"], 10);
        assert_eq!(v["errorRate"], 0.5);
        assert_eq!(v["outage"], true);
        assert!(v["routes"].as_array().unwrap().is_empty());
    }
}
