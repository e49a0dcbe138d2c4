use thiserror::Error;

/// Errors raised by catalog lookups
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Missing {what} in {url}")]
    ExtractionMiss { url: String, what: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl CatalogError {
    /// Network-level failure, timeouts included
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Transport(_) | CatalogError::Timeout { .. })
    }

    pub fn is_status(&self) -> bool {
        matches!(self, CatalogError::Status { .. })
    }

    pub(crate) fn miss(url: &str, what: impl Into<String>) -> Self {
        CatalogError::ExtractionMiss {
            url: url.to_string(),
            what: what.into(),
        }
    }
}
