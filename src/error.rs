// Error types for binary resolution and retrieval

use crate::version::Edition;

/// Failures raised while resolving, locating or downloading a MongoDB binary.
///
/// Only [`FetchError::NotFoundInRepository`] is recoverable: the download
/// orchestrator treats it as "try the next repository". Everything else is
/// propagated to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    #[error("Unsupported OS {0}")]
    UnsupportedPlatform(String),

    #[error("Edition '{edition}' not supported by binary repository '{repository}'")]
    UnsupportedEdition { edition: String, repository: String },

    #[error("{0}")]
    NotFoundInRepository(String),

    #[error(
        "Cannot download file. You need to have 'curl' or 'wget' command in your path in order to proceed."
    )]
    MissingDownloadTool,

    #[error("No mongodb binary (version: '{version}', edition: '{edition}')")]
    BinaryNotFound { version: String, edition: Edition },

    #[error("Invalid binary repository configuration '{name}': {reason}")]
    InvalidRepositoryConfig { name: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFoundInRepository(_))
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
