pub mod types;
pub mod documentai;

pub use types::*;
pub use documentai::*;

use thiserror::Error;

/// Failures talking to the remote extraction processor.
/// Surfaced to the caller unchanged; nothing here is retried.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction processor misconfigured: {0}")]
    Configuration(String),

    #[error("No access token available for the extraction processor")]
    MissingCredentials,

    #[error("Extraction processor unreachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Extraction processor returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),
}

impl ExtractionError {
    /// Auth and quota rejections come back as 401/403/429.
    pub fn is_auth_or_quota(&self) -> bool {
        match self {
            Self::MissingCredentials => true,
            Self::Service { status, .. } => matches!(status, 401 | 403 | 429),
            _ => false,
        }
    }
}
