use std::collections::VecDeque;

use bagport_api::{Part, RemoteService};
use tracing::debug;

use crate::{Chunk, TransferError};

/// Ships chunks to pre-signed part destinations.
///
/// The destination list is consumed front to back, one per chunk; the
/// server must have issued at least as many destinations as the stream
/// produces chunks. The returned content-integrity tag has its
/// surrounding quotes stripped before being recorded.
pub struct PartUploader<'a> {
    service: &'a dyn RemoteService,
    urls: VecDeque<String>,
}

impl<'a> PartUploader<'a> {
    pub fn new(service: &'a dyn RemoteService, urls: Vec<String>) -> Self {
        Self {
            service,
            urls: urls.into(),
        }
    }

    /// Destinations not yet consumed.
    pub fn remaining_urls(&self) -> usize {
        self.urls.len()
    }

    /// Uploads one chunk as one part.
    pub async fn upload(&mut self, chunk: Chunk) -> Result<Part, TransferError> {
        let Some(url) = self.urls.pop_front() else {
            return Err(TransferError::PartUrlsExhausted {
                part_number: chunk.part_number,
            });
        };

        let bytes = chunk.data.len();
        let etag = self.service.upload_part(&url, chunk.data).await?;
        let etag = etag.trim_matches('"').to_string();
        debug!(part = chunk.part_number, bytes, "uploaded part");

        Ok(Part {
            etag,
            part_number: chunk.part_number,
        })
    }
}
