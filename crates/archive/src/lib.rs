//! Streaming zip archive producer.
//!
//! Turns a bag directory into a lazy sequence of zip-container byte
//! fragments without ever materializing the archive in memory or on disk.
//! The consumer pulls fragments; the encoder runs behind a small bounded
//! pipe and suspends whenever the consumer is busy.

mod stream;

pub use stream::{ArchiveStream, CompressionMode, ENTRY_PERMISSIONS, FILE_READ_CHUNK};

/// Errors produced while streaming an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip encoding error: {0}")]
    Zip(#[from] async_zip::error::ZipError),

    #[error("archive producer task failed: {0}")]
    Task(String),
}
