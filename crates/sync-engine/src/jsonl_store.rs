//! Append-only JSONL metadata store.
//!
//! Each collection is one file, `{dir}/{collection}.jsonl`. The first line is
//! a `#`-prefixed header; every following line is one record with its
//! assigned id. Records are never rewritten in place.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_media_model::{MediaRecord, RecordId};

use crate::metadata::{apply_query, validate_collection, MetadataStore, RecordFilter, RecordOrder};

const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionHeader {
    schema_version: String,
    collection: String,
}

pub struct JsonlMetadataStore {
    dir: PathBuf,
    // Serializes appends so lines from concurrent creates never interleave.
    write_lock: Mutex<()>,
}

impl JsonlMetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> ClipsyncResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::info!(path = %dir.display(), "Opened JSONL metadata store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn collection_file(&self, collection: &str) -> ClipsyncResult<PathBuf> {
        validate_collection(collection)?;
        Ok(self.dir.join(format!("{collection}.jsonl")))
    }
}

fn append_record(path: &Path, collection: &str, record: &MediaRecord) -> ClipsyncResult<()> {
    let is_new = !path.exists();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut buf = String::new();
    if is_new {
        let header = CollectionHeader {
            schema_version: SCHEMA_VERSION.to_string(),
            collection: collection.to_string(),
        };
        buf.push_str(&format!("# {}\n", serde_json::to_string(&header)?));
    }
    buf.push_str(&serde_json::to_string(record)?);
    buf.push('\n');

    file.write_all(buf.as_bytes())?;
    file.sync_data()?;
    Ok(())
}

/// Parse a collection file. Malformed lines are skipped with a warning.
fn parse_records(path: &Path, contents: &str) -> Vec<MediaRecord> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|(idx, line)| match serde_json::from_str::<MediaRecord>(line) {
            Ok(record) if record.id.is_some() => Some(record),
            Ok(_) => {
                tracing::warn!(path = %path.display(), line = idx + 1, "Record without id; skipping");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), line = idx + 1, error = %e, "Malformed record; skipping");
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl MetadataStore for JsonlMetadataStore {
    #[tracing::instrument(skip(self, record), fields(owner = %record.owner_id))]
    async fn create(&self, collection: &str, record: &MediaRecord) -> ClipsyncResult<RecordId> {
        let path = self.collection_file(collection)?;
        let id = RecordId::new(Uuid::new_v4().to_string());
        let stored = record.clone().with_id(id.clone());
        let collection_name = collection.to_string();

        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || append_record(&path, &collection_name, &stored))
            .await
            .map_err(join_error)??;

        tracing::debug!(%id, "Appended record");
        Ok(id)
    }

    #[tracing::instrument(skip(self, filter))]
    async fn query(
        &self,
        collection: &str,
        filter: &RecordFilter,
        order: RecordOrder,
    ) -> ClipsyncResult<Vec<MediaRecord>> {
        let path = self.collection_file(collection)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ClipsyncError::query_failed(format!("{}: {e}", path.display()))),
        };
        Ok(apply_query(parse_records(&path, &contents), filter, order))
    }
}

fn join_error(e: tokio::task::JoinError) -> anyhow::Error {
    anyhow::anyhow!("metadata write task failed: {e}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsync_media_model::Identity;

    fn temp_store(name: &str) -> JsonlMetadataStore {
        let dir = std::env::temp_dir().join(format!("clipsync_jsonl_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        JsonlMetadataStore::new(dir).unwrap()
    }

    #[tokio::test]
    async fn create_then_query_by_owner() {
        let store = temp_store("owner");
        let mine = MediaRecord::new(Identity::from("u1"), 1000, "file:///a.mp4", 10);
        let theirs = MediaRecord::new(Identity::from("u2"), 2000, "file:///b.mp4", 20);

        let id = store.create("videos", &mine).await.unwrap();
        store.create("videos", &theirs).await.unwrap();

        let found = store
            .query(
                "videos",
                &RecordFilter::OwnerIs(Identity::from("u1")),
                RecordOrder::CreatedAtDesc,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_ref(), Some(&id));
        assert_eq!(found[0].client_key, mine.client_key);
    }

    #[tokio::test]
    async fn file_starts_with_header_and_skips_garbage() {
        let store = temp_store("garbage");
        let record = MediaRecord::new(Identity::from("u1"), 5, "file:///c.mp4", 0);
        store.create("videos", &record).await.unwrap();

        let path = store.collection_file("videos").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# {"));

        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"{not json\n")
            .unwrap();

        let all = store
            .query("videos", &RecordFilter::All, RecordOrder::CreatedAtDesc)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn missing_collection_is_empty() {
        let store = temp_store("missing");
        let all = store
            .query("videos", &RecordFilter::All, RecordOrder::CreatedAtAsc)
            .await
            .unwrap();
        assert!(all.is_empty());
    }
}
