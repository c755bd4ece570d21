//! Scan and emission configuration.

use std::str::FromStr;

/// Default port for generated mock servers.
pub const DEFAULT_PORT: u16 = 3001;

/// Source-file extensions the scanner downloads.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "ts", "tsx", "jsx", "mjs", "cjs", "py", "java", "go", "rb", "php", "swift", "kotlin",
];

/// Upper bound on in-flight file fetches.
pub const MAX_CONCURRENCY: usize = 8;

/// Knobs for a repository scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Hosting provider REST API base.
    pub api_base: String,
    /// Raw file content base.
    pub raw_base: String,
    /// Bearer token sent with every request when present.
    pub token: Option<String>,
    /// Maximum number of source files downloaded per scan.
    pub max_files: usize,
    /// Files larger than this are skipped.
    pub max_file_bytes: usize,
    /// In-flight file fetches, clamped to `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
    pub request_timeout_ms: u64,
    /// Retries on 5xx / 429 / transport errors. Tree listings are never
    /// retried; they fall back to another branch instead.
    pub max_retries: u32,
    /// A repository whose last commit is older than this is reported inactive.
    pub activity_threshold_days: i64,
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            token: None,
            max_files: 50,
            max_file_bytes: 1024 * 1024,
            concurrency: 4,
            request_timeout_ms: 10_000,
            max_retries: 2,
            activity_threshold_days: 365,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ScanConfig {
    /// Defaults overlaid with `MOCKCRAFT_*` variables and a GitHub token.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("MOCKCRAFT_API_BASE") {
            config.api_base = base;
        }
        if let Ok(base) = std::env::var("MOCKCRAFT_RAW_BASE") {
            config.raw_base = base;
        }
        config.token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("NPM_CONFIG_GITHUB_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        if let Some(v) = env_parse("MOCKCRAFT_MAX_FILES") {
            config.max_files = v;
        }
        if let Some(v) = env_parse("MOCKCRAFT_MAX_FILE_BYTES") {
            config.max_file_bytes = v;
        }
        if let Some(v) = env_parse("MOCKCRAFT_CONCURRENCY") {
            config.concurrency = v;
        }
        if let Some(v) = env_parse("MOCKCRAFT_TIMEOUT_MS") {
            config.request_timeout_ms = v;
        }

        config
    }

    /// Point both API and raw content requests at one base URL (used by tests).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_base = base.to_string();
        self.raw_base = format!("{base}/raw");
        self
    }

    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Whether `path` ends in one of the recognised source extensions.
    pub fn is_source_file(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}

/// Options for the emitted server program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}
