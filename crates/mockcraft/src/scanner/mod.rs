//! Endpoint inference: resolve a repository, download its source files,
//! extract call sites and reduce them to a canonical endpoint set.
//!
//! File downloads run through an ordered, bounded stream so at most
//! `concurrency` requests are in flight and results merge in listing order
//! regardless of completion order. All accumulation is local to a single
//! [`Scanner::scan`] call; dropping the future abandons the scan cleanly.

pub mod extract;
pub mod github;
pub mod http_client;
pub mod reduce;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::types::{CallSite, ScanReport, SkippedFile, TypeDeclaration};
use futures::stream::{self, StreamExt};
use github::{GitHubClient, ResolvedRepository};

/// What the caller asked to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    /// A repository URL or `owner/repo` reference, optionally with `/tree/<branch>`.
    RepositoryUrl(String),
    /// An uploaded archive or file. Not supported.
    UploadedFile { name: String },
}

/// Repository scanner bound to one configuration.
#[derive(Clone)]
pub struct Scanner {
    client: GitHubClient,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> ScanResult<Self> {
        Ok(Self {
            client: GitHubClient::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan a repository and return its endpoints, declarations and call sites.
    pub async fn scan(&self, input: ScanInput) -> ScanResult<ScanReport> {
        let identifier = match input {
            ScanInput::RepositoryUrl(url) => url,
            ScanInput::UploadedFile { name } => {
                return Err(ScanError::UnsupportedInputKind(format!(
                    "file-based scanning is not supported (got '{name}'); provide a repository URL"
                )));
            }
        };

        let resolved = self
            .client
            .resolve_repository(&identifier, &self.config)
            .await?;
        tracing::info!(
            "scanning {} on '{}' ({} files)",
            resolved.repo,
            resolved.branch,
            resolved.files.len()
        );

        let report = self.scan_files(resolved).await;
        tracing::info!(
            "scan complete: {} endpoints, {} declarations, {} files skipped",
            report.endpoints.len(),
            report.interfaces.len(),
            report.skipped_files.len()
        );
        Ok(report)
    }

    async fn scan_files(&self, resolved: ResolvedRepository) -> ScanReport {
        let ResolvedRepository {
            repo,
            branch,
            files,
            metadata,
        } = resolved;

        let max_bytes = self.config.max_file_bytes;
        let mut fetched = stream::iter(files.iter().cloned())
            .map(|path| {
                let client = &self.client;
                let repo = &repo;
                let branch = branch.as_str();
                async move {
                    let text = client.raw_file(repo, branch, &path, max_bytes).await;
                    (path, text)
                }
            })
            .buffered(self.config.effective_concurrency());

        let mut fetch_calls: Vec<CallSite> = Vec::new();
        let mut axios_calls: Vec<CallSite> = Vec::new();
        let mut interfaces: Vec<TypeDeclaration> = Vec::new();
        let mut skipped_files: Vec<SkippedFile> = Vec::new();
        let mut files_scanned = 0usize;

        while let Some((path, text)) = fetched.next().await {
            let text = match text {
                Ok(text) => text,
                Err(e) => {
                    let failure = ScanError::FileFetchFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    tracing::debug!("{failure}");
                    skipped_files.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            files_scanned += 1;
            let extraction = extract::extract(&text, &path);
            if extraction.is_empty() {
                tracing::trace!("{}", ScanError::FileParseYieldedNothing { path: path.clone() });
                continue;
            }
            tracing::debug!(
                "{path}: {} fetch, {} axios, {} declarations",
                extraction.fetch_calls.len(),
                extraction.axios_calls.len(),
                extraction.type_declarations.len()
            );
            fetch_calls.extend(extraction.fetch_calls);
            axios_calls.extend(extraction.axios_calls);
            interfaces.extend(extraction.type_declarations);
        }
        drop(fetched);

        let endpoints = reduce::reduce(fetch_calls.iter().chain(axios_calls.iter()));

        ScanReport {
            endpoints,
            interfaces,
            fetch_calls,
            axios_calls,
            repo_metadata: metadata,
            branch,
            files_scanned,
            skipped_files,
        }
    }
}

/// One-shot convenience around [`Scanner::scan`].
pub async fn scan_repository(input: ScanInput, config: &ScanConfig) -> ScanResult<ScanReport> {
    Scanner::new(config.clone())?.scan(input).await
}
