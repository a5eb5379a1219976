//! Bag discovery and recorder metadata.
//!
//! A bag is a directory holding `.db3` recording files plus one
//! `metadata.yaml` descriptor. This crate finds bag directories on a
//! storage device, parses the descriptor, and assembles the registration
//! payload the remote service expects.

mod metadata;
mod scanner;

pub use metadata::{BagMetadata, METADATA_FILE};
pub use scanner::{Bag, RECORDING_EXT, find_unregistered_bags, is_bag_dir};

/// Errors produced while reading bags from disk.
#[derive(Debug, thiserror::Error)]
pub enum BagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata descriptor error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
