//! CLI handler for `mockcraft serve <repo>`.

use crate::cli::{output, scan_cmd};
use crate::preview;
use anyhow::{bail, Result};
use mockcraft::{generate_mock_server, FaultProfile, ScanConfig, ServerOptions};

/// Scan, compile and host the mock server until interrupted.
pub async fn run(
    repo: &str,
    config: ScanConfig,
    fault: FaultProfile,
    options: ServerOptions,
) -> Result<()> {
    let report = scan_cmd::scan(repo, config).await?;
    if report.endpoints.is_empty() {
        bail!("no endpoints found in {repo}; nothing to serve");
    }

    let server = generate_mock_server(&report.endpoints, fault, options);
    output::say(format!(
        "  Serving {} routes on http://127.0.0.1:{} (Ctrl+C to stop)\n",
        server.routes.len(),
        server.port
    ));

    tokio::select! {
        result = preview::serve(server) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
