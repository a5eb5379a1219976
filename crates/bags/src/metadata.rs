//! Recorder metadata descriptor (`metadata.yaml`).
//!
//! The descriptor is the rosbag2-style document written next to the
//! recordings. Registration needs the derived time range and topic list
//! plus the raw document re-encoded as JSON.

use std::path::Path;

use bagport_api::TopicRegistration;
use serde::Deserialize;

use crate::BagError;

/// Descriptor file name inside every bag directory.
pub const METADATA_FILE: &str = "metadata.yaml";

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[derive(Debug, Deserialize)]
struct Descriptor {
    rosbag2_bagfile_information: Info,
}

#[derive(Debug, Deserialize)]
struct Info {
    starting_time: StartingTime,
    duration: Duration,
    #[serde(default)]
    topics_with_message_count: Vec<TopicCount>,
}

#[derive(Debug, Deserialize)]
struct StartingTime {
    nanoseconds_since_epoch: i64,
}

#[derive(Debug, Deserialize)]
struct Duration {
    nanoseconds: i64,
}

#[derive(Debug, Deserialize)]
struct TopicCount {
    topic_metadata: TopicMetadata,
}

#[derive(Debug, Deserialize)]
struct TopicMetadata {
    name: String,
    #[serde(rename = "type")]
    topic_type: String,
}

/// Parsed bag descriptor, reduced to what registration needs.
#[derive(Debug, Clone)]
pub struct BagMetadata {
    /// Recording start, whole seconds since the epoch.
    pub start_time: i64,
    /// Recording end, whole seconds since the epoch.
    pub end_time: i64,
    pub topics: Vec<TopicRegistration>,
    /// The raw descriptor re-encoded as JSON for the registration form.
    pub raw_json: String,
}

impl BagMetadata {
    /// Loads and parses the descriptor inside `bag_dir`.
    pub fn load(bag_dir: &Path) -> Result<Self, BagError> {
        let text = std::fs::read_to_string(bag_dir.join(METADATA_FILE))?;
        Self::parse(&text)
    }

    /// Parses a descriptor document.
    pub fn parse(text: &str) -> Result<Self, BagError> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        let descriptor: Descriptor = serde_yaml::from_str(text)?;
        let info = descriptor.rosbag2_bagfile_information;

        let start_time = info.starting_time.nanoseconds_since_epoch / NANOS_PER_SECOND;
        let duration = info.duration.nanoseconds / NANOS_PER_SECOND;

        let topics = info
            .topics_with_message_count
            .into_iter()
            .map(|t| TopicRegistration {
                name: t.topic_metadata.name,
                topic_type: t.topic_metadata.topic_type,
                frequency: 0,
                max_frequency: false,
            })
            .collect();

        Ok(Self {
            start_time,
            end_time: start_time + duration,
            topics,
            raw_json: serde_json::to_string(&raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
rosbag2_bagfile_information:
  version: 4
  storage_identifier: sqlite3
  duration:
    nanoseconds: 7500000000
  starting_time:
    nanoseconds_since_epoch: 1650000000000000000
  message_count: 420
  topics_with_message_count:
    - topic_metadata:
        name: /odom
        type: nav_msgs/msg/Odometry
        serialization_format: cdr
      message_count: 300
    - topic_metadata:
        name: /tf
        type: tf2_msgs/msg/TFMessage
        serialization_format: cdr
      message_count: 120
"#;

    #[test]
    fn parses_time_range_in_whole_seconds() {
        let meta = BagMetadata::parse(SAMPLE).unwrap();
        assert_eq!(meta.start_time, 1_650_000_000);
        // 7.5 s duration truncates to 7.
        assert_eq!(meta.end_time, 1_650_000_007);
    }

    #[test]
    fn parses_topic_list() {
        let meta = BagMetadata::parse(SAMPLE).unwrap();
        assert_eq!(meta.topics.len(), 2);
        assert_eq!(meta.topics[0].name, "/odom");
        assert_eq!(meta.topics[0].topic_type, "nav_msgs/msg/Odometry");
        assert_eq!(meta.topics[0].frequency, 0);
        assert!(!meta.topics[0].max_frequency);
        assert_eq!(meta.topics[1].name, "/tf");
    }

    #[test]
    fn raw_json_preserves_the_full_descriptor() {
        let meta = BagMetadata::parse(SAMPLE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&meta.raw_json).unwrap();
        assert_eq!(
            value["rosbag2_bagfile_information"]["message_count"],
            serde_json::json!(420)
        );
        assert_eq!(
            value["rosbag2_bagfile_information"]["storage_identifier"],
            serde_json::json!("sqlite3")
        );
    }

    #[test]
    fn missing_topics_defaults_to_empty() {
        let text = r#"
rosbag2_bagfile_information:
  duration:
    nanoseconds: 1000000000
  starting_time:
    nanoseconds_since_epoch: 2000000000
"#;
        let meta = BagMetadata::parse(text).unwrap();
        assert!(meta.topics.is_empty());
        assert_eq!(meta.start_time, 2);
        assert_eq!(meta.end_time, 3);
    }

    #[test]
    fn malformed_descriptor_is_an_error() {
        assert!(BagMetadata::parse("not: [valid").is_err());
        assert!(BagMetadata::parse("unrelated: {}").is_err());
    }
}
