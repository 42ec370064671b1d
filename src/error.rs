use thiserror::Error;

/// Failures surfaced by the catalog client, the stores and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    /// Search or detail fetch failed: transport error, non-success status or bad body.
    #[error("network failure: {0}")]
    Network(String),

    /// Bookmark store or key-value store read/write failed.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl Error {
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
