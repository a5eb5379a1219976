//! Batch upload orchestration.
//!
//! Uploads bags strictly sequentially; one bag's terminal failure is
//! reported and the batch continues with the next bag.

use bagport_api::Session;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::pipeline::BagUploader;
use crate::types::{BagResult, UploadEvent, UploadTarget};

/// Drives a sequence of bag uploads with per-bag failure isolation.
pub struct BatchUploader<'a> {
    uploader: BagUploader<'a>,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl<'a> BatchUploader<'a> {
    pub fn new(uploader: BagUploader<'a>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            uploader,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Uploads every target in order. The session is shared across the
    /// batch: a refresh performed for one bag carries over to the next.
    pub async fn run(&self, session: &mut Session, targets: &[UploadTarget]) -> Vec<BagResult> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            match self.uploader.upload(session, target, &self.events_tx).await {
                Ok(parts) => {
                    info!(bag = %target.name, parts = parts.len(), "bag uploaded");
                    results.push(BagResult {
                        bag_uuid: target.bag_uuid.clone(),
                        name: target.name.clone(),
                        success: true,
                        parts: parts.len(),
                        error: None,
                    });
                }
                Err(e) => {
                    error!(bag = %target.name, error = %e, "bag upload failed");
                    results.push(BagResult {
                        bag_uuid: target.bag_uuid.clone(),
                        name: target.name.clone(),
                        success: false,
                        parts: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        results
    }
}
