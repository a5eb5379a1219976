use serde::{Deserialize, Serialize};

/// Token pair for one logged-in session.
///
/// The access token is short-lived and replaced wholesale by
/// [`RemoteService::refresh`](crate::RemoteService::refresh); the refresh
/// token never changes for the lifetime of the process. Sessions are plain
/// values passed explicitly to every authenticated call; there is no
/// ambient token state.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    access: String,
    refresh: String,
}

impl Session {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Current access token, sent as the Bearer credential.
    pub fn access(&self) -> &str {
        &self.access
    }

    /// Long-lived refresh token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh
    }

    /// Returns a session carrying a fresh access token and the same
    /// refresh token.
    pub fn with_access(&self, access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: self.refresh.clone(),
        }
    }
}

/// One uploaded part of a multipart upload.
///
/// `part_number` is 1-based and contiguous across a bag's parts; `etag` is
/// the content-integrity tag the destination returned, with the surrounding
/// quotes already stripped. The JSON key casing is fixed by the completion
/// endpoint's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(rename = "ETag")]
    pub etag: String,
    #[serde(rename = "PartNumber")]
    pub part_number: i32,
}

/// A robot as returned by the robot listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: i64,
    pub name: String,
}

/// A registered bag as returned by the bag listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagSummary {
    pub bag_uuid: String,
    #[serde(default)]
    pub name: String,
}

/// One topic entry in a bag registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRegistration {
    pub name: String,
    #[serde(rename = "type")]
    pub topic_type: String,
    pub frequency: i64,
    pub max_frequency: bool,
}

/// Everything the registration endpoint needs to create a bag record.
///
/// `metadata` carries the raw recorder descriptor re-encoded as a JSON
/// string; `topics` is serialized to a JSON string at send time. Both ride
/// inside the form body rather than as structured JSON.
#[derive(Debug, Clone)]
pub struct BagRegistration {
    pub bag_uuid: String,
    pub name: String,
    pub robot_id: i64,
    pub size: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub metadata: String,
    pub topics: Vec<TopicRegistration>,
}
