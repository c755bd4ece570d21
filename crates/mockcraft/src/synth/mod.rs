//! Mock backend synthesis: sample payloads, compiled route handlers and the
//! emitted server program.

pub mod emit;
pub mod handler;
pub mod route;
pub mod schema;

use crate::config::ServerOptions;
use crate::fault::FaultProfile;
use crate::types::{Endpoint, ScanReport};
use serde::{Deserialize, Serialize};

pub use emit::{MockServerConfig, ServerProgram};
pub use handler::{HandlerBehavior, HandlerResponse, RouteHandler};
pub use route::RoutePattern;

/// Version tag carried by every generated API schema document.
pub const API_SCHEMA_VERSION: &str = "1.0.0";

/// Compile every endpoint into a server configuration.
pub fn generate_mock_server(
    endpoints: &[Endpoint],
    fault: FaultProfile,
    options: ServerOptions,
) -> MockServerConfig {
    let routes = handler::compile_all(endpoints, &fault);
    tracing::debug!("compiled {} route handlers", routes.len());
    MockServerConfig::new(routes, fault, options)
}

/// Compile and emit in one step.
pub fn generate_program(
    endpoints: &[Endpoint],
    fault: FaultProfile,
    options: ServerOptions,
) -> (MockServerConfig, ServerProgram) {
    let config = generate_mock_server(endpoints, fault, options);
    let program = emit::render(&config);
    (config, program)
}

/// A named type declaration as listed in an API schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    pub name: String,
    pub definition: String,
}

/// Schema document summarizing a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSchema {
    pub endpoints: Vec<Endpoint>,
    pub interfaces: Vec<InterfaceEntry>,
    pub version: String,
}

pub fn api_schema(report: &ScanReport) -> ApiSchema {
    ApiSchema {
        endpoints: report.endpoints.clone(),
        interfaces: report
            .interfaces
            .iter()
            .map(|decl| InterfaceEntry {
                name: decl.name.clone(),
                definition: decl.definition(),
            })
            .collect(),
        version: API_SCHEMA_VERSION.to_string(),
    }
}
