//! Bag upload flow: request destinations, stream parts, report completion.
//!
//! This crate implements the **business logic** for shipping a bag
//! directory to the remote service as one zip container split across a
//! multipart upload. It is a library crate with no transport
//! dependencies; callers provide a
//! [`RemoteService`](bagport_api::RemoteService) implementation.
//!
//! # Pipeline
//!
//! 1. **Requesting**: obtain a fresh ordered pre-signed destination list
//! 2. **Streaming**: archive stream, chunk aggregator, and part uploader
//!    in lockstep, one resident chunk at a time
//! 3. **Reporting**: submit the ordered part list to the completion
//!    endpoint
//!
//! Any transport or auth failure triggers exactly one token refresh and
//! one full re-run of the sequence; a second failure propagates. Batches
//! isolate failures per bag.

mod batch;
mod error;
mod pipeline;
mod types;

pub use batch::BatchUploader;
pub use error::UploadError;
pub use pipeline::{BagUploader, MAX_ATTEMPTS};
pub use types::{BagResult, UploadEvent, UploadPhase, UploadTarget};
