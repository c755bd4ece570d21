//! Mockcraft: infer the HTTP endpoints a frontend repository calls and
//! synthesize a fault-injecting mock backend for them.

pub mod config;
pub mod error;
pub mod fault;
pub mod scanner;
pub mod synth;
pub mod types;

pub use config::{ScanConfig, ServerOptions, DEFAULT_PORT};
pub use error::{ScanError, ScanResult};
pub use fault::FaultProfile;
pub use scanner::{scan_repository, ScanInput, Scanner};
pub use synth::{
    api_schema, generate_mock_server, generate_program, ApiSchema, MockServerConfig, RouteHandler,
    ServerProgram,
};
pub use types::*;
