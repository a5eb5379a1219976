//! Per-bag upload pipeline.
//!
//! Runs the Requesting, Streaming, and Reporting phases against a
//! [`RemoteService`], with an attempt loop bounded to exactly two runs:
//! a retryable failure on the first run triggers one token refresh and a
//! full restart (fresh destination list, re-streamed archive); any
//! failure on the second run propagates.

use bagport_api::{Part, RemoteService, Session};
use bagport_archive::{ArchiveStream, CompressionMode};
use bagport_transfer::{CHUNK_THRESHOLD, Chunk, ChunkAggregator, PartUploader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::UploadError;
use crate::types::{UploadEvent, UploadPhase, UploadTarget};

/// Upper bound on upload attempts per bag: the first run plus one
/// refresh-and-retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// Uploads one bag directory as a chunked multipart archive.
pub struct BagUploader<'a> {
    service: &'a dyn RemoteService,
    compression: CompressionMode,
    chunk_threshold: usize,
}

impl<'a> BagUploader<'a> {
    /// Creates an uploader with deflate compression and the production
    /// chunk threshold.
    pub fn new(service: &'a dyn RemoteService) -> Self {
        Self {
            service,
            compression: CompressionMode::default(),
            chunk_threshold: CHUNK_THRESHOLD,
        }
    }

    /// Selects the archive compression mode.
    pub fn with_compression(mut self, mode: CompressionMode) -> Self {
        self.compression = mode;
        self
    }

    /// Overrides the chunk threshold (tests and bandwidth-constrained
    /// deployments).
    pub fn with_chunk_threshold(mut self, threshold: usize) -> Self {
        self.chunk_threshold = threshold;
        self
    }

    /// Uploads `target`, refreshing the session and restarting the whole
    /// sequence once if a transport or auth failure interrupts the first
    /// attempt. On success the ordered part list is returned (it has also
    /// been reported to the completion endpoint).
    pub async fn upload(
        &self,
        session: &mut Session,
        target: &UploadTarget,
        events_tx: &mpsc::Sender<UploadEvent>,
    ) -> Result<Vec<Part>, UploadError> {
        let mut attempt = 1;
        loop {
            match self.attempt(session, target, events_tx).await {
                Ok(parts) => {
                    self.emit_phase(events_tx, target, UploadPhase::Done).await;
                    let _ = events_tx
                        .send(UploadEvent::Completed {
                            bag_uuid: target.bag_uuid.clone(),
                            parts: parts.len(),
                        })
                        .await;
                    info!(bag = %target.bag_uuid, parts = parts.len(), "upload complete");
                    return Ok(parts);
                }
                Err(e) if attempt < MAX_ATTEMPTS && e.is_retryable() => {
                    warn!(
                        bag = %target.bag_uuid,
                        error = %e,
                        "upload attempt failed, refreshing session and restarting"
                    );
                    self.emit_phase(events_tx, target, UploadPhase::Failed).await;
                    let _ = events_tx
                        .send(UploadEvent::Retrying {
                            bag_uuid: target.bag_uuid.clone(),
                            reason: e.to_string(),
                        })
                        .await;

                    // The refreshed session must be in place before any
                    // retried call reads it. A failed refresh propagates.
                    *session = self
                        .service
                        .refresh(session)
                        .await
                        .map_err(UploadError::Service)?;
                    attempt += 1;
                }
                Err(e) => {
                    self.emit_phase(events_tx, target, UploadPhase::Failed).await;
                    let _ = events_tx
                        .send(UploadEvent::Failed {
                            bag_uuid: target.bag_uuid.clone(),
                            error: e.to_string(),
                        })
                        .await;
                    error!(bag = %target.bag_uuid, error = %e, "upload failed");
                    return Err(e);
                }
            }
        }
    }

    /// One full Requesting, Streaming, Reporting run.
    async fn attempt(
        &self,
        session: &Session,
        target: &UploadTarget,
        events_tx: &mpsc::Sender<UploadEvent>,
    ) -> Result<Vec<Part>, UploadError> {
        // Requesting: the count is server-determined; destinations are
        // consumed lazily, one per completed chunk.
        self.emit_phase(events_tx, target, UploadPhase::Requesting)
            .await;
        let urls = self
            .service
            .request_part_urls(session, &target.bag_uuid)
            .await?;

        // Streaming: each completed chunk is uploaded before further
        // chunk assembly proceeds, so at most one chunk is resident.
        self.emit_phase(events_tx, target, UploadPhase::Streaming)
            .await;
        let mut stream = ArchiveStream::open(target.path.clone(), self.compression);
        let mut aggregator = ChunkAggregator::with_threshold(self.chunk_threshold);
        let mut uploader = PartUploader::new(self.service, urls);
        let mut parts = Vec::new();

        while let Some(fragment) = stream.next_fragment().await? {
            if let Some(chunk) = aggregator.push(fragment) {
                self.ship(&mut uploader, chunk, target, events_tx, &mut parts)
                    .await?;
            }
        }
        // The remainder always goes out, even for an empty archive.
        self.ship(
            &mut uploader,
            aggregator.finish(),
            target,
            events_tx,
            &mut parts,
        )
        .await?;

        // Reporting.
        self.emit_phase(events_tx, target, UploadPhase::Reporting)
            .await;
        self.service
            .complete_upload(session, &target.bag_uuid, &parts)
            .await?;

        Ok(parts)
    }

    async fn ship(
        &self,
        uploader: &mut PartUploader<'_>,
        chunk: Chunk,
        target: &UploadTarget,
        events_tx: &mpsc::Sender<UploadEvent>,
        parts: &mut Vec<Part>,
    ) -> Result<(), UploadError> {
        let bytes = chunk.data.len();
        let part = uploader.upload(chunk).await?;
        let _ = events_tx
            .send(UploadEvent::PartUploaded {
                bag_uuid: target.bag_uuid.clone(),
                part_number: part.part_number,
                bytes,
            })
            .await;
        parts.push(part);
        Ok(())
    }

    async fn emit_phase(
        &self,
        events_tx: &mpsc::Sender<UploadEvent>,
        target: &UploadTarget,
        phase: UploadPhase,
    ) {
        let _ = events_tx
            .send(UploadEvent::Phase {
                bag_uuid: target.bag_uuid.clone(),
                phase,
            })
            .await;
    }
}
