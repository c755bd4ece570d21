//! Mockcraft entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mockcraft::{ServerOptions, DEFAULT_PORT};

use mockcraft_server::cli::{self, output, FaultArgs, ScanArgs};
use mockcraft_server::logging;

#[derive(Parser)]
#[command(
    name = "mockcraft",
    about = "Mockcraft: infer a frontend's API and generate a fault-injecting mock backend",
    version,
    after_help = "Run 'mockcraft <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and list the endpoints it calls
    Scan {
        /// Repository URL or owner/repo (optionally .../tree/<branch>)
        repo: String,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Generate a standalone mock server program
    Generate {
        /// Repository URL or owner/repo (optionally .../tree/<branch>)
        repo: String,
        /// Write the program to this file instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        fault: FaultArgs,
    },
    /// Scan a repository and host its mock server in-process
    Serve {
        /// Repository URL or owner/repo (optionally .../tree/<branch>)
        repo: String,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        fault: FaultArgs,
    },
    /// Start the HTTP REST API
    Api {
        /// Port for the REST API
        #[arg(long, default_value_t = 3000)]
        port: u16,
        /// Default port written into generated servers
        #[arg(long, default_value_t = DEFAULT_PORT)]
        mock_port: u16,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    logging::init(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Scan { repo, scan } => cli::scan_cmd::run(&repo, scan.config()).await,
        Commands::Generate {
            repo,
            out,
            scan,
            fault,
        } => {
            async {
                let profile = fault.profile()?;
                cli::generate_cmd::run(
                    &repo,
                    scan.config(),
                    profile,
                    fault.options(),
                    out.as_deref(),
                )
                .await
            }
            .await
        }
        Commands::Serve { repo, scan, fault } => {
            async {
                let profile = fault.profile()?;
                cli::serve_cmd::run(&repo, scan.config(), profile, fault.options()).await
            }
            .await
        }
        Commands::Api {
            port,
            mock_port,
            scan,
        } => cli::api_cmd::run(port, scan.config(), ServerOptions { port: mock_port }).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mockcraft", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
