//! Mockcraft server: CLI, REST API and preview runtime for generated mock backends.

pub mod cli;
pub mod logging;
pub mod preview;
pub mod rest;

pub use rest::{ApiError, ApiState};
