//! CLI handler for `mockcraft scan <repo>`.

use crate::cli::output;
use anyhow::Result;
use mockcraft::{ScanConfig, ScanInput, ScanReport, Scanner};

/// Scan a repository and return its report.
pub async fn scan(repo: &str, config: ScanConfig) -> Result<ScanReport> {
    let scanner = Scanner::new(config)?;
    Ok(scanner.scan(ScanInput::RepositoryUrl(repo.to_string())).await?)
}

/// Run the scan command.
pub async fn run(repo: &str, config: ScanConfig) -> Result<()> {
    output::say(format!("  Scanning {repo}...\n"));
    let report = scan(repo, config).await?;

    if output::is_json() {
        output::print_json(&report);
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    println!(
        "  Branch: {}   files scanned: {}   skipped: {}",
        report.branch,
        report.files_scanned,
        report.skipped_files.len()
    );
    if let Some(meta) = &report.repo_metadata {
        println!(
            "  {} ★{}  forks {}  {}",
            meta.name,
            meta.stars,
            meta.forks,
            if meta.is_active { "active" } else { "inactive" }
        );
    }
    println!();

    if report.endpoints.is_empty() {
        println!("  No endpoints found.");
    } else {
        println!("  Endpoints:");
        for endpoint in &report.endpoints {
            println!("    {:<7} {}", endpoint.method, endpoint.path);
        }
    }

    if !report.interfaces.is_empty() {
        println!();
        println!("  Declarations:");
        for decl in &report.interfaces {
            println!("    {}", decl.name);
        }
    }

    if !report.skipped_files.is_empty() {
        println!();
        println!("  Skipped:");
        for skipped in &report.skipped_files {
            println!("    {:<32} {}", skipped.path, skipped.reason);
        }
    }
    println!();

    Ok(())
}
