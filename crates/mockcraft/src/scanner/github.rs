//! GitHub repository resolution: reference parsing, branch selection,
//! recursive tree listing and raw file download.

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::scanner::http_client::HttpClient;
use crate::types::RepoMetadata;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Branch tried when the resolved branch has no tree.
pub const FALLBACK_BRANCH: &str = "master";

/// Branch assumed when the repository metadata cannot be read.
pub const DEFAULT_BRANCH: &str = "main";

/// A parsed `owner/repo[/tree/branch]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
}

impl RepoRef {
    /// Parse a GitHub URL (`https://github.com/o/r`, `github.com/o/r/tree/b`)
    /// or a bare `o/r` reference.
    pub fn parse(identifier: &str) -> ScanResult<Self> {
        let invalid = || ScanError::InvalidRepositoryReference(identifier.to_string());

        let mut cleaned = identifier.trim();
        cleaned = cleaned.split(['?', '#']).next().unwrap_or("");
        loop {
            let before = cleaned.len();
            cleaned = cleaned.trim_end_matches('/');
            let cut = cleaned.len().saturating_sub(4);
            if cleaned.len() >= 4
                && cleaned
                    .get(cut..)
                    .is_some_and(|suffix| suffix.eq_ignore_ascii_case(".git"))
            {
                cleaned = &cleaned[..cut];
            }
            if cleaned.len() == before {
                break;
            }
        }

        let rest = match cleaned.find("github.com/") {
            Some(idx) => &cleaned[idx + "github.com/".len()..],
            None if cleaned.contains("://") => return Err(invalid()),
            None => cleaned,
        };

        let segments: Vec<&str> = rest.split('/').collect();
        let (owner, repo) = match segments.as_slice() {
            [owner, repo, ..] if is_valid_name(owner) && is_valid_name(repo) => (*owner, *repo),
            _ => return Err(invalid()),
        };

        let branch = match segments.get(2..) {
            Some(["tree", branch, ..]) if !branch.is_empty() => Some(branch.to_string()),
            _ => None,
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch,
        })
    }
}

impl FromStr for RepoRef {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{branch}")?;
        }
        Ok(())
    }
}

fn is_valid_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Outcome of repository resolution.
#[derive(Debug, Clone)]
pub struct ResolvedRepository {
    pub repo: RepoRef,
    /// Branch the tree was actually listed from.
    pub branch: String,
    /// Source files to scan, in tree order, capped at `max_files`.
    pub files: Vec<String>,
    pub metadata: Option<RepoMetadata>,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RepoInfo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    network_count: u64,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Option<Vec<TreeEntry>>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

// ── Client ──────────────────────────────────────────────────────────────────

/// Read-only client for the GitHub REST API and raw content host.
#[derive(Clone)]
pub struct GitHubClient {
    http: HttpClient,
    api_base: String,
    raw_base: String,
}

impl GitHubClient {
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo)
    }

    async fn repository_info(&self, repo: &RepoRef) -> ScanResult<RepoInfo> {
        self.http.get_json(&self.repo_url(repo)).await
    }

    /// Language name → bytes of code.
    pub async fn languages(&self, repo: &RepoRef) -> ScanResult<BTreeMap<String, u64>> {
        self.http
            .get_json(&format!("{}/languages", self.repo_url(repo)))
            .await
    }

    /// Author date of the most recent commit on the default branch.
    pub async fn latest_commit_date(&self, repo: &RepoRef) -> ScanResult<Option<DateTime<Utc>>> {
        let commits: Vec<CommitEntry> = self
            .http
            .get_json(&format!("{}/commits?per_page=1", self.repo_url(repo)))
            .await?;
        Ok(commits
            .into_iter()
            .next()
            .and_then(|c| c.commit.author)
            .and_then(|a| a.date))
    }

    /// Paths of all blobs in the recursive tree of `branch`.
    ///
    /// Tried once: the fallback branch is the only retry a tree listing gets.
    pub async fn tree(&self, repo: &RepoRef, branch: &str) -> ScanResult<Vec<String>> {
        let url = format!("{}/git/trees/{branch}?recursive=1", self.repo_url(repo));
        let resp: TreeResponse = self.http.single_attempt().get_json(&url).await?;
        let entries = resp.tree.ok_or_else(|| ScanError::UnexpectedResponse {
            url: url.clone(),
            reason: "no tree returned".to_string(),
        })?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| e.path)
            .collect())
    }

    /// Raw text of one file.
    pub async fn raw_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        max_bytes: usize,
    ) -> ScanResult<String> {
        let url = format!(
            "{}/{}/{}/{branch}/{path}",
            self.raw_base, repo.owner, repo.repo
        );
        self.http.get_text(&url, max_bytes).await
    }

    /// Resolve an identifier to a branch and a capped list of source files.
    ///
    /// Metadata lookups degrade independently; only an unparsable identifier
    /// or a tree that is unreachable on both the resolved branch and
    /// [`FALLBACK_BRANCH`] is an error.
    pub async fn resolve_repository(
        &self,
        identifier: &str,
        config: &ScanConfig,
    ) -> ScanResult<ResolvedRepository> {
        let repo = RepoRef::parse(identifier)?;

        let info = match self.repository_info(&repo).await {
            Ok(info) => Some(info),
            Err(e) => {
                log_degraded("repository", &e);
                None
            }
        };

        let mut branch = repo
            .branch
            .clone()
            .or_else(|| info.as_ref().and_then(|i| i.default_branch.clone()))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let metadata = match info {
            Some(info) => Some(self.metadata_block(&repo, info, config).await),
            None => None,
        };

        let blobs = match self.tree(&repo, &branch).await {
            Ok(blobs) => blobs,
            Err(first) if branch != FALLBACK_BRANCH => {
                tracing::info!("tree listing failed on '{branch}' ({first}), retrying on '{FALLBACK_BRANCH}'");
                let failed = std::mem::replace(&mut branch, FALLBACK_BRANCH.to_string());
                self.tree(&repo, &branch).await.map_err(|e| {
                    tracing::warn!("tree listing failed on '{FALLBACK_BRANCH}': {e}");
                    ScanError::RepositoryUnreachable {
                        owner: repo.owner.clone(),
                        repo: repo.repo.clone(),
                        branch: failed,
                    }
                })?
            }
            Err(e) => {
                tracing::warn!("tree listing failed on '{branch}': {e}");
                return Err(ScanError::RepositoryUnreachable {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                    branch,
                });
            }
        };

        let total = blobs.len();
        let files: Vec<String> = blobs
            .into_iter()
            .filter(|p| config.is_source_file(p))
            .take(config.max_files)
            .collect();
        tracing::debug!(
            "{repo}: {total} blobs on '{branch}', {} source files selected",
            files.len()
        );

        Ok(ResolvedRepository {
            repo,
            branch,
            files,
            metadata,
        })
    }

    async fn metadata_block(
        &self,
        repo: &RepoRef,
        info: RepoInfo,
        config: &ScanConfig,
    ) -> RepoMetadata {
        let (languages, last_commit) =
            tokio::join!(self.languages(repo), self.latest_commit_date(repo));

        let languages = languages.unwrap_or_else(|e| {
            log_degraded("languages", &e);
            BTreeMap::new()
        });
        let is_active = match last_commit {
            Ok(Some(date)) => is_active(date, Utc::now(), config.activity_threshold_days),
            Ok(None) => true,
            Err(e) => {
                log_degraded("commit activity", &e);
                true
            }
        };

        RepoMetadata {
            name: info.name,
            description: info.description.unwrap_or_default(),
            languages,
            stars: info.stargazers_count,
            forks: info.forks_count,
            watchers: info.watchers_count,
            contributors: info.network_count,
            is_active,
        }
    }
}

fn log_degraded(what: &'static str, cause: &ScanError) {
    let degraded = ScanError::MetadataUnavailable {
        what,
        reason: cause.to_string(),
    };
    tracing::warn!("{degraded}");
}

/// A repository is active when its last commit is younger than `threshold_days`.
pub fn is_active(last_commit: DateTime<Utc>, now: DateTime<Utc>, threshold_days: i64) -> bool {
    (now - last_commit).num_days() < threshold_days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_https_url() {
        let r = RepoRef::parse("https://github.com/vercel/next.js").unwrap();
        assert_eq!(r.owner, "vercel");
        assert_eq!(r.repo, "next.js");
        assert_eq!(r.branch, None);
    }

    #[test]
    fn test_parse_strips_git_suffix_and_slashes() {
        let r = RepoRef::parse("https://github.com/acme/web.git/").unwrap();
        assert_eq!(r.repo, "web");
        let r = RepoRef::parse("git@github.com/acme/web.GIT").unwrap();
        assert_eq!(r.repo, "web");
    }

    #[test]
    fn test_parse_branch_segment() {
        let r = RepoRef::parse("github.com/acme/web/tree/develop").unwrap();
        assert_eq!(r.branch.as_deref(), Some("develop"));
        let r = RepoRef::parse("acme/web/tree/feature-x/src").unwrap();
        assert_eq!(r.branch.as_deref(), Some("feature-x"));
        let r = RepoRef::parse("acme/web/blob/main/README.md").unwrap();
        assert_eq!(r.branch, None);
    }

    #[test]
    fn test_parse_bare_and_query() {
        let r = RepoRef::parse("  acme/web?tab=readme ").unwrap();
        assert_eq!((r.owner.as_str(), r.repo.as_str()), ("acme", "web"));
        assert_eq!(r.to_string(), "acme/web");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for bad in [
            "",
            "acme",
            "https://github.com/acme",
            "https://gitlab.com/acme/web",
            "acme//web",
            "a b/c",
        ] {
            assert!(
                matches!(RepoRef::parse(bad), Err(ScanError::InvalidRepositoryReference(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_is_active_threshold() {
        let now = Utc::now();
        assert!(is_active(now - Duration::days(10), now, 365));
        assert!(is_active(now - Duration::days(364), now, 365));
        assert!(!is_active(now - Duration::days(365), now, 365));
        assert!(!is_active(now - Duration::days(900), now, 365));
    }
}
