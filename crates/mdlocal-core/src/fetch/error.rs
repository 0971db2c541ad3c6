//! Fetch failure type and its classification.

use thiserror::Error;

/// Error returned by a single image fetch or by persisting its bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Fetched bytes could not be written to the asset directory.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// A fetcher that panicked instead of returning an error.
    #[error("{0}")]
    Other(String),
}

/// Coarse failure class reported per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Transport,
    Unknown,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Curl(e) => classify_curl_error(e),
            FetchError::Http { .. } => FetchErrorKind::Transport,
            FetchError::Storage(_) | FetchError::Other(_) => FetchErrorKind::Unknown,
        }
    }

    /// Human-readable line for the run summary; always names the URL.
    pub fn detail(&self, url: &str) -> String {
        match self.kind() {
            FetchErrorKind::Timeout => format!("download timed out: {url}"),
            FetchErrorKind::Transport => format!("download failed: {url}: {self}"),
            FetchErrorKind::Unknown => format!("unexpected error: {url}: {self}"),
        }
    }
}

/// Classify a curl error. Every non-timeout curl failure is a transport error.
pub fn classify_curl_error(e: &curl::Error) -> FetchErrorKind {
    if e.is_operation_timedout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::Transport
    }
}
