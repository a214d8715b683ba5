use thiserror::Error;

/// Failures surfaced by an agent invocation. Corrupt persisted session data
/// never shows up here; the session manager recovers from that on its own.
///
/// None of these are retried internally. Retry and backoff policy belongs to
/// the caller.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The runtime target is not configured (missing agent runtime ARN or a
    /// malformed endpoint). Raised before any network I/O.
    #[error("agent runtime not configured: {0}")]
    Configuration(String),

    /// The identity source could not supply a bearer token or user id.
    /// Raised before any network I/O; the caller should re-authenticate.
    #[error("not authenticated: {0}")]
    Authentication(String),

    /// The endpoint could not be reached, or the stream broke mid-read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The runtime answered with a non-2xx status.
    #[error("agent runtime error (HTTP {status}): {body}")]
    Protocol { status: u16, body: String },
}

impl From<reqwest::Error> for InvokeError {
    fn from(e: reqwest::Error) -> Self {
        InvokeError::Transport(e.to_string())
    }
}
