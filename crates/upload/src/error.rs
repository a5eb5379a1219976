//! Upload error types.

use bagport_api::ApiError;
use bagport_archive::ArchiveError;
use bagport_transfer::TransferError;

/// Errors produced while uploading a bag.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Local streaming failed (file vanished or became unreadable).
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A remote call failed.
    #[error("service error: {0}")]
    Service(#[from] ApiError),

    /// The server and client disagree about the upload's shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl UploadError {
    /// True when a token refresh plus a full re-run of the upload can
    /// recover: transport faults and auth rejections. Local I/O and
    /// protocol violations recur deterministically and fail fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::Service(e) => e.is_retryable(),
            UploadError::Archive(_) | UploadError::Protocol(_) => false,
        }
    }
}

impl From<TransferError> for UploadError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Service(e) => UploadError::Service(e),
            TransferError::PartUrlsExhausted { .. } => UploadError::Protocol(e.to_string()),
        }
    }
}
