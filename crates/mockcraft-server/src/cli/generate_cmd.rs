//! CLI handler for `mockcraft generate <repo>`.

use crate::cli::output;
use crate::cli::scan_cmd;
use anyhow::{Context, Result};
use mockcraft::{generate_program, FaultProfile, ScanConfig, ServerOptions};
use std::path::Path;

/// Run the generate command.
///
/// Writes the program to `out` when given, otherwise to stdout.
pub async fn run(
    repo: &str,
    config: ScanConfig,
    fault: FaultProfile,
    options: ServerOptions,
    out: Option<&Path>,
) -> Result<()> {
    let report = scan_cmd::scan(repo, config).await?;
    let (server, program) = generate_program(&report.endpoints, fault, options);

    if let Some(path) = out {
        std::fs::write(path, program.as_str())
            .with_context(|| format!("failed to write {}", path.display()))?;
        output::say(format!(
            "  Wrote {} routes to {}",
            server.routes.len(),
            path.display()
        ));
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "config": server,
            "code": program.as_str(),
        }));
    } else if out.is_none() {
        print!("{program}");
    }

    Ok(())
}
