use std::path::PathBuf;

/// Phases of a single upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Asking the service for a fresh destination list.
    Requesting,
    /// Driving the archive, chunk, and part stages.
    Streaming,
    /// Submitting the ordered part list.
    Reporting,
    Done,
    Failed,
}

/// A bag ready for upload.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub bag_uuid: String,
    pub name: String,
    pub path: PathBuf,
}

/// Progress events emitted during an upload.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Phase {
        bag_uuid: String,
        phase: UploadPhase,
    },
    PartUploaded {
        bag_uuid: String,
        part_number: i32,
        bytes: usize,
    },
    /// The first attempt failed; the session was refreshed and the whole
    /// sequence restarts.
    Retrying {
        bag_uuid: String,
        reason: String,
    },
    Completed {
        bag_uuid: String,
        parts: usize,
    },
    Failed {
        bag_uuid: String,
        error: String,
    },
}

/// Outcome of one bag in a batch.
#[derive(Debug, Clone)]
pub struct BagResult {
    pub bag_uuid: String,
    pub name: String,
    pub success: bool,
    /// Parts uploaded (0 when the bag failed before completing).
    pub parts: usize,
    pub error: Option<String>,
}
