//! Error taxonomy for scanning and synthesis.

/// All errors that can occur while scanning a repository or synthesizing a mock server.
///
/// Only [`ScanError::InvalidRepositoryReference`], [`ScanError::RepositoryUnreachable`]
/// and [`ScanError::UnsupportedInputKind`] abort a scan. The per-file and metadata
/// variants are logged and folded into the report as absent data.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Invalid repository reference '{0}': expected a GitHub owner/repo")]
    InvalidRepositoryReference(String),

    #[error("Repository {owner}/{repo} unreachable: tree listing failed on '{branch}' and 'master'")]
    RepositoryUnreachable {
        owner: String,
        repo: String,
        branch: String,
    },

    #[error("Unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    #[error("Failed to fetch {path}: {reason}")]
    FileFetchFailed { path: String, reason: String },

    #[error("{path} yielded no call sites or declarations")]
    FileParseYieldedNothing { path: String },

    #[error("Metadata unavailable ({what}): {reason}")]
    MetadataUnavailable { what: &'static str, reason: String },

    #[error("Invalid fault profile: {0}")]
    InvalidFaultProfile(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::InvalidRepositoryReference(_) => "INVALID_REPOSITORY_REFERENCE",
            ScanError::RepositoryUnreachable { .. } => "REPOSITORY_UNREACHABLE",
            ScanError::UnsupportedInputKind(_) => "UNSUPPORTED_INPUT_KIND",
            ScanError::FileFetchFailed { .. } => "FILE_FETCH_FAILED",
            ScanError::FileParseYieldedNothing { .. } => "FILE_PARSE_YIELDED_NOTHING",
            ScanError::MetadataUnavailable { .. } => "METADATA_UNAVAILABLE",
            ScanError::InvalidFaultProfile(_) => "INVALID_FAULT_PROFILE",
            ScanError::Status { .. }
            | ScanError::UnexpectedResponse { .. }
            | ScanError::Http(_) => "HTTP_ERROR",
            ScanError::Json(_) => "JSON_ERROR",
            ScanError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether this error is caused by the caller's input rather than the remote side.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidRepositoryReference(_)
                | ScanError::UnsupportedInputKind(_)
                | ScanError::InvalidFaultProfile(_)
        )
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(ScanError::InvalidRepositoryReference("x".into()).is_input_error());
        assert!(ScanError::UnsupportedInputKind("file".into()).is_input_error());
        assert!(!ScanError::RepositoryUnreachable {
            owner: "o".into(),
            repo: "r".into(),
            branch: "main".into(),
        }
        .is_input_error());
    }

    #[test]
    fn test_unreachable_message_names_both_branches() {
        let err = ScanError::RepositoryUnreachable {
            owner: "acme".into(),
            repo: "web".into(),
            branch: "develop".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme/web"));
        assert!(msg.contains("develop"));
        assert!(msg.contains("master"));
        assert_eq!(err.code(), "REPOSITORY_UNREACHABLE");
    }
}
