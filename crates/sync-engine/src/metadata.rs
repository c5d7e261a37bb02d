//! Metadata store contract.

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_media_model::{Identity, MediaRecord, RecordId};

/// Collection that holds clip records.
pub const VIDEOS_COLLECTION: &str = "videos";

/// Which records a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    OwnerIs(Identity),
}

impl RecordFilter {
    pub fn matches(&self, record: &MediaRecord) -> bool {
        match self {
            Self::All => true,
            Self::OwnerIs(owner) => record.is_owned_by(owner),
        }
    }
}

/// Sort order on `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

/// Document store holding one record per uploaded clip.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persist `record` and return the identifier the store assigned.
    async fn create(&self, collection: &str, record: &MediaRecord) -> ClipsyncResult<RecordId>;

    async fn query(
        &self,
        collection: &str,
        filter: &RecordFilter,
        order: RecordOrder,
    ) -> ClipsyncResult<Vec<MediaRecord>>;
}

/// Filter and stably sort `records` the way a store query would.
pub fn apply_query(
    records: impl IntoIterator<Item = MediaRecord>,
    filter: &RecordFilter,
    order: RecordOrder,
) -> Vec<MediaRecord> {
    let mut matched: Vec<MediaRecord> = records.into_iter().filter(|r| filter.matches(r)).collect();
    match order {
        RecordOrder::CreatedAtDesc => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        RecordOrder::CreatedAtAsc => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    matched
}

/// Collection names map onto file names, so keep them to a safe alphabet.
pub fn validate_collection(collection: &str) -> ClipsyncResult<()> {
    let ok = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ClipsyncError::config(format!(
            "Invalid collection name: {collection:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, created_at: i64) -> MediaRecord {
        MediaRecord::new(Identity::from(owner), created_at, "memory://x", 0)
    }

    #[test]
    fn owner_filter_and_descending_order() {
        let records = vec![record("u1", 1), record("u2", 5), record("u1", 3)];
        let out = apply_query(
            records,
            &RecordFilter::OwnerIs(Identity::from("u1")),
            RecordOrder::CreatedAtDesc,
        );
        let stamps: Vec<i64> = out.iter().map(|r| r.created_at).collect();
        assert_eq!(stamps, vec![3, 1]);
    }

    #[test]
    fn ascending_keeps_ties_in_insertion_order() {
        let a = record("u1", 2);
        let b = record("u1", 2);
        let out = apply_query(
            vec![a.clone(), b.clone()],
            &RecordFilter::All,
            RecordOrder::CreatedAtAsc,
        );
        assert_eq!(out[0].client_key, a.client_key);
        assert_eq!(out[1].client_key, b.client_key);
    }

    #[test]
    fn collection_names() {
        assert!(validate_collection(VIDEOS_COLLECTION).is_ok());
        assert!(validate_collection("../videos").is_err());
        assert!(validate_collection("").is_err());
    }
}
