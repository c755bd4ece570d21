//! CLI subcommand implementations for the `mockcraft` binary.

pub mod api_cmd;
pub mod generate_cmd;
pub mod output;
pub mod scan_cmd;
pub mod serve_cmd;

use anyhow::Result;
use clap::Args;
use mockcraft::{FaultProfile, ScanConfig, ServerOptions, DEFAULT_PORT};

/// Scan limits. Unset flags fall back to `MOCKCRAFT_*` environment values.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Maximum number of source files to download
    #[arg(long)]
    pub max_files: Option<usize>,
    /// Concurrent file downloads (1-8)
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ScanArgs {
    pub fn config(&self) -> ScanConfig {
        self.apply(ScanConfig::from_env())
    }

    pub fn apply(&self, mut config: ScanConfig) -> ScanConfig {
        if let Some(max_files) = self.max_files {
            config.max_files = max_files;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
        config
    }
}

/// Fault-injection and port flags for generated servers.
#[derive(Args, Debug, Clone)]
pub struct FaultArgs {
    /// Delay added to every request, in milliseconds
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub latency_ms: i64,
    /// Probability (0-1) of an injected failure
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub error_rate: f64,
    /// Reject every request with 503
    #[arg(long)]
    pub outage: bool,
    /// Expand list payloads to 100 items
    #[arg(long)]
    pub pagination_stress: bool,
    /// Port the mock server listens on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for FaultArgs {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            error_rate: 0.0,
            outage: false,
            pagination_stress: false,
            port: DEFAULT_PORT,
        }
    }
}

impl FaultArgs {
    /// Validated fault profile. Out-of-range values are an error.
    pub fn profile(&self) -> Result<FaultProfile> {
        Ok(FaultProfile::try_new(self.latency_ms, self.error_rate)?
            .with_outage(self.outage)
            .with_pagination_stress(self.pagination_stress))
    }

    pub fn options(&self) -> ServerOptions {
        ServerOptions { port: self.port }
    }
}
