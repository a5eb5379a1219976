//! Chunk aggregation and part upload.
//!
//! Sits between the archive byte stream and the remote multipart
//! destinations: [`ChunkAggregator`] regroups arbitrary byte fragments
//! into ~1 GiB chunks, and [`PartUploader`] ships each chunk to the next
//! pre-signed destination, one per chunk, front to back.

mod chunker;
mod part;

pub use chunker::{CHUNK_THRESHOLD, Chunk, ChunkAggregator};
pub use part::PartUploader;

use bagport_api::ApiError;

/// Errors produced by the transfer stages.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("service error: {0}")]
    Service(#[from] ApiError),

    /// The server issued fewer destinations than the stream produced
    /// chunks. A part-count mismatch is a contract violation, not a
    /// transient fault.
    #[error("part destination list exhausted at part {part_number}")]
    PartUrlsExhausted { part_number: i32 },
}
