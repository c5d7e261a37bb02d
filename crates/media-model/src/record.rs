//! Media record metadata.
//!
//! A record is created only after its clip has been fully uploaded, so the
//! retrieval `url` is always present. The store assigns `id` on creation;
//! until then `client_key` identifies the record.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clipsync_common::clock::ms_to_local;

use crate::identity::Identity;

/// Identifier assigned by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata for one uploaded clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Store-assigned identifier. `None` before first persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    /// Human-readable label derived from the capture timestamp.
    pub title: String,

    /// Locator of the durable content.
    pub url: String,

    /// Identity that created the record.
    pub owner_id: Identity,

    /// Capture timestamp in milliseconds since the Unix epoch.
    pub created_at: i64,

    /// Uploaded byte length; 0 when the size could not be determined.
    #[serde(default)]
    pub file_size: u64,

    /// Client-generated token, stable before and after persistence.
    #[serde(default = "Uuid::new_v4")]
    pub client_key: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl MediaRecord {
    /// Build an unpersisted record for a clip captured at `created_at`.
    pub fn new(
        owner_id: Identity,
        created_at: i64,
        url: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            id: None,
            title: title_for_timestamp(created_at),
            url: url.into(),
            owner_id,
            created_at,
            file_size,
            client_key: Uuid::new_v4(),
            thumbnail: None,
            duration_secs: None,
        }
    }

    /// Attach the identifier the store assigned.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Use a token generated ahead of the record, e.g. one already baked
    /// into the uploaded object's path.
    pub fn with_client_key(mut self, client_key: Uuid) -> Self {
        self.client_key = client_key;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Key for list rendering: the store id when known, else the client token.
    pub fn list_key(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => self.client_key.to_string(),
        }
    }

    /// Whether `identity` owns this record.
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        &self.owner_id == identity
    }

    /// Capture date for gallery captions, in local time.
    pub fn date_label(&self) -> String {
        ms_to_local(self.created_at).format("%Y-%m-%d").to_string()
    }
}

/// Title shown for a clip captured at `created_at_ms`.
pub fn title_for_timestamp(created_at_ms: i64) -> String {
    format!(
        "Video from {}",
        ms_to_local(created_at_ms).format("%Y-%m-%d %H:%M:%S")
    )
}

/// Most recent first. Ties keep their relative order when used with a
/// stable sort.
pub fn newest_first(a: &MediaRecord, b: &MediaRecord) -> Ordering {
    b.created_at.cmp(&a.created_at)
}
