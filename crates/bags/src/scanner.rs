//! Bag directory discovery.
//!
//! A directory counts as a bag when it carries the metadata descriptor
//! and nothing but `.db3` recording files beside it. Scanning compares
//! directory names against the set of bag UUIDs the service already
//! knows, so previously imported bags are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bagport_api::BagRegistration;
use tracing::warn;
use uuid::Uuid;

use crate::metadata::{BagMetadata, METADATA_FILE};
use crate::BagError;

/// Recording file extension.
pub const RECORDING_EXT: &str = "db3";

/// A bag directory discovered on disk, ready for registration.
#[derive(Debug, Clone)]
pub struct Bag {
    /// Directory base name; doubles as the registered display name.
    pub name: String,
    pub path: PathBuf,
    /// Sum of the sizes of the regular files directly inside.
    pub size: u64,
    pub metadata: BagMetadata,
}

impl Bag {
    /// Opens a bag directory, parsing its descriptor and sizing its
    /// contents.
    pub fn open(path: &Path) -> Result<Self, BagError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = BagMetadata::load(path)?;
        let size = dir_size(path)?;
        Ok(Self {
            name,
            path: path.to_path_buf(),
            size,
            metadata,
        })
    }

    /// Builds the registration payload, minting a fresh bag UUID.
    pub fn registration(&self, robot_id: i64) -> BagRegistration {
        BagRegistration {
            bag_uuid: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            robot_id,
            size: self.size,
            start_time: self.metadata.start_time,
            end_time: self.metadata.end_time,
            metadata: self.metadata.raw_json.clone(),
            topics: self.metadata.topics.clone(),
        }
    }
}

/// Returns true when `path` is a bag directory.
pub fn is_bag_dir(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };

    let mut has_metadata = false;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name == METADATA_FILE {
            has_metadata = true;
            continue;
        }
        let is_recording = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext == RECORDING_EXT);
        if !is_recording {
            return false;
        }
    }
    has_metadata
}

/// Scans `root` for bag directories whose names are not yet registered.
///
/// A bag with an unreadable or malformed descriptor is skipped with a
/// warning rather than aborting the scan. Results are sorted by name.
pub fn find_unregistered_bags(
    root: &Path,
    registered: &HashSet<String>,
) -> Result<Vec<Bag>, BagError> {
    let mut bags = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if registered.contains(&name) || !is_bag_dir(&path) {
            continue;
        }
        match Bag::open(&path) {
            Ok(bag) => bags.push(bag),
            Err(e) => warn!(bag = %name, error = %e, "skipping unreadable bag"),
        }
    }
    bags.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(bags)
}

fn dir_size(path: &Path) -> Result<u64, BagError> {
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"
rosbag2_bagfile_information:
  duration:
    nanoseconds: 2000000000
  starting_time:
    nanoseconds_since_epoch: 1700000000000000000
  topics_with_message_count:
    - topic_metadata:
        name: /scan
        type: sensor_msgs/msg/LaserScan
      message_count: 10
"#;

    fn make_bag(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join(METADATA_FILE), DESCRIPTOR).unwrap();
        std::fs::write(dir.join("recording_0.db3"), vec![1u8; 128]).unwrap();
        std::fs::write(dir.join("recording_1.db3"), vec![2u8; 64]).unwrap();
        dir
    }

    #[test]
    fn recognizes_a_bag_directory() {
        let root = TempDir::new().unwrap();
        let dir = make_bag(root.path(), "session-1");
        assert!(is_bag_dir(&dir));
    }

    #[test]
    fn rejects_directory_with_foreign_files() {
        let root = TempDir::new().unwrap();
        let dir = make_bag(root.path(), "session-1");
        std::fs::write(dir.join("notes.txt"), b"hello").unwrap();
        assert!(!is_bag_dir(&dir));
    }

    #[test]
    fn rejects_directory_without_descriptor() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("no-meta");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("recording_0.db3"), b"x").unwrap();
        assert!(!is_bag_dir(&dir));
    }

    #[test]
    fn rejects_plain_files() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("stray.db3");
        std::fs::write(&file, b"x").unwrap();
        assert!(!is_bag_dir(&file));
    }

    #[test]
    fn open_computes_size_and_metadata() {
        let root = TempDir::new().unwrap();
        let dir = make_bag(root.path(), "session-1");

        let bag = Bag::open(&dir).unwrap();
        assert_eq!(bag.name, "session-1");
        assert_eq!(bag.size, 128 + 64 + DESCRIPTOR.len() as u64);
        assert_eq!(bag.metadata.start_time, 1_700_000_000);
        assert_eq!(bag.metadata.end_time, 1_700_000_002);
        assert_eq!(bag.metadata.topics.len(), 1);
    }

    #[test]
    fn registration_carries_bag_fields_and_fresh_uuid() {
        let root = TempDir::new().unwrap();
        let bag = Bag::open(&make_bag(root.path(), "session-1")).unwrap();

        let reg = bag.registration(42);
        assert_eq!(reg.name, "session-1");
        assert_eq!(reg.robot_id, 42);
        assert_eq!(reg.size, bag.size);
        assert_eq!(reg.start_time, bag.metadata.start_time);
        assert!(Uuid::parse_str(&reg.bag_uuid).is_ok());

        // Each registration mints its own UUID.
        assert_ne!(reg.bag_uuid, bag.registration(42).bag_uuid);
    }

    #[test]
    fn scan_skips_registered_and_non_bags() {
        let root = TempDir::new().unwrap();
        make_bag(root.path(), "fresh-b");
        make_bag(root.path(), "fresh-a");
        make_bag(root.path(), "already-known");
        std::fs::create_dir(root.path().join("not-a-bag")).unwrap();
        std::fs::write(root.path().join("loose.db3"), b"x").unwrap();

        let registered: HashSet<String> = ["already-known".to_string()].into();
        let bags = find_unregistered_bags(root.path(), &registered).unwrap();

        let names: Vec<&str> = bags.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["fresh-a", "fresh-b"]);
    }

    #[test]
    fn scan_skips_bag_with_malformed_descriptor() {
        let root = TempDir::new().unwrap();
        make_bag(root.path(), "good");
        let bad = root.path().join("bad");
        std::fs::create_dir(&bad).unwrap();
        std::fs::write(bad.join(METADATA_FILE), "nonsense: [").unwrap();
        std::fs::write(bad.join("r.db3"), b"x").unwrap();

        let bags = find_unregistered_bags(root.path(), &HashSet::new()).unwrap();
        assert_eq!(bags.len(), 1);
        assert_eq!(bags[0].name, "good");
    }

    #[test]
    fn scan_of_missing_root_errors() {
        let result = find_unregistered_bags(Path::new("/no/such/root"), &HashSet::new());
        assert!(matches!(result, Err(BagError::Io(_))));
    }
}
