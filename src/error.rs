use std::path::PathBuf;

use crate::ResponseBody;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Malformed request descriptor. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The retry counter went past the configured limit.
    #[error("max retry limit exceeded: retry {retry} > limit {limit}")]
    RetryLimitExceeded { retry: u32, limit: u32 },
    /// Non-retryable HTTP status with the decoded response body.
    #[error("request failed with status {status}: {body}")]
    Request { status: u16, body: ResponseBody },
    /// The local file could not be opened for streaming.
    #[error("cannot open {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Configuration document could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl UploadError {
    /// HTTP status of a terminal request failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
