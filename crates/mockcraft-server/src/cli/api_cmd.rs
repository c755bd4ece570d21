//! CLI handler for `mockcraft api`.

use crate::cli::output;
use crate::rest::{self, ApiState};
use anyhow::Result;
use mockcraft::{ScanConfig, ServerOptions};
use std::sync::Arc;

/// Start the REST API on `port`. Generated servers default to `options.port`.
pub async fn run(port: u16, config: ScanConfig, options: ServerOptions) -> Result<()> {
    let state = Arc::new(ApiState::new(config, options)?);
    output::say(format!("  REST API on http://127.0.0.1:{port} (Ctrl+C to stop)\n"));

    tokio::select! {
        result = rest::start(port, state) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
