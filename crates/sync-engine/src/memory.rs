//! In-memory blob and metadata stores.
//!
//! Used by tests and by embedders that do not need persistence. Both stores
//! can be told to fail so callers can exercise their error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_media_model::{MediaRecord, RecordId};

use crate::blob::{validate_object_path, BlobStore, UploadTask};
use crate::metadata::{apply_query, MetadataStore, RecordFilter, RecordOrder};

type Locator = dyn Fn(&str) -> String + Send + Sync;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> ClipsyncResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| ClipsyncError::Other(anyhow::anyhow!("{what} lock poisoned")))
}

/// Blob store holding objects in a map.
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    chunk_size: usize,
    locator: Box<Locator>,
    fail_after: Mutex<Option<u64>>,
    fail_deletes: AtomicBool,
    uploads_started: AtomicU64,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            chunk_size: 64 * 1024,
            locator: Box::new(|path| format!("memory://{path}")),
            fail_after: Mutex::new(None),
            fail_deletes: AtomicBool::new(false),
            uploads_started: AtomicU64::new(0),
        }
    }

    /// Report progress every `chunk_size` bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Build retrieval locators with `locator(path)`.
    pub fn with_locator(mut self, locator: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Make subsequent uploads fail once `bytes` have been transferred.
    /// `None` restores normal behavior.
    pub fn fail_uploads_after(&self, bytes: Option<u64>) {
        if let Ok(mut guard) = self.fail_after.lock() {
            *guard = bytes;
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(path))
            .unwrap_or(false)
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(path).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uploads accepted so far, including ones that later failed.
    pub fn uploads_started(&self) -> u64 {
        self.uploads_started.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn begin_resumable_upload(&self, path: &str, bytes: Vec<u8>) -> ClipsyncResult<UploadTask> {
        validate_object_path(path)?;
        self.uploads_started.fetch_add(1, Ordering::SeqCst);

        let fail_after = *lock(&self.fail_after, "upload failure")?;
        let locator = (self.locator)(path);
        let objects = Arc::clone(&self.objects);
        let chunk_size = self.chunk_size;
        let (reporter, task) = UploadTask::channel(path);

        tokio::spawn(async move {
            let total = bytes.len() as u64;
            reporter.progress(0, total);
            let mut transferred = 0u64;
            for chunk in bytes.chunks(chunk_size) {
                let next = transferred + chunk.len() as u64;
                if fail_after.is_some_and(|limit| next > limit) {
                    let path = reporter.path().to_string();
                    reporter.finish(Err(ClipsyncError::transfer_failed(
                        path,
                        "connection reset during upload",
                    )));
                    return;
                }
                transferred = next;
                reporter.progress(transferred, total);
                tokio::task::yield_now().await;
            }

            let stored = objects
                .lock()
                .map(|mut objects| {
                    objects.insert(reporter.path().to_string(), bytes);
                })
                .map_err(|_| ClipsyncError::transfer_failed(reporter.path(), "blob map poisoned"));
            reporter.finish(stored.map(|()| locator));
        });

        Ok(task)
    }

    async fn delete(&self, path: &str) -> ClipsyncResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ClipsyncError::Other(anyhow::anyhow!(
                "delete refused for {path}"
            )));
        }
        lock(&self.objects, "blob map")?.remove(path);
        Ok(())
    }
}

/// Metadata store holding collections in a map.
#[derive(Default)]
pub struct MemoryMetadataStore {
    collections: Mutex<HashMap<String, Vec<MediaRecord>>>,
    next_id: AtomicU64,
    fail_creates: AtomicBool,
    fail_queries: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Every record in `collection`, in insertion order.
    pub fn records(&self, collection: &str) -> Vec<MediaRecord> {
        self.collections
            .lock()
            .ok()
            .and_then(|c| c.get(collection).cloned())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create(&self, collection: &str, record: &MediaRecord) -> ClipsyncResult<RecordId> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ClipsyncError::Other(anyhow::anyhow!(
                "write rejected by metadata store"
            )));
        }
        let id = RecordId::new(format!(
            "doc-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        ));
        lock(&self.collections, "collection map")?
            .entry(collection.to_string())
            .or_default()
            .push(record.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: &RecordFilter,
        order: RecordOrder,
    ) -> ClipsyncResult<Vec<MediaRecord>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ClipsyncError::query_failed("metadata store unavailable"));
        }
        Ok(apply_query(self.records(collection), filter, order))
    }
}
