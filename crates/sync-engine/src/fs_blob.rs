//! Filesystem blob store.
//!
//! Objects live at `{root}/{object path}`. Uploads are written chunk by chunk
//! to a `.part` sibling and renamed into place once complete, so a reader
//! never sees a partial object. Locators are `file://` URLs.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};

use crate::blob::{validate_object_path, BlobStore, UploadReporter, UploadTask};

pub struct FsBlobStore {
    root: PathBuf,
    chunk_size: usize,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>, chunk_size: usize) -> ClipsyncResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        tracing::info!(path = %root.display(), "Opened filesystem blob store");
        Ok(Self {
            root,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of an object path.
    pub fn object_file(&self, path: &str) -> ClipsyncResult<PathBuf> {
        validate_object_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }

    /// `file://` locator for a stored object.
    pub fn locator_for(file: &Path) -> String {
        format!("file://{}", file.display())
    }
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn begin_resumable_upload(&self, path: &str, bytes: Vec<u8>) -> ClipsyncResult<UploadTask> {
        let dest = self.object_file(path)?;
        let (reporter, task) = UploadTask::channel(path);
        let chunk_size = self.chunk_size;

        tokio::spawn(async move {
            let result = write_chunked(&reporter, &dest, &bytes, chunk_size).await;
            let result = match result {
                Ok(()) => {
                    tracing::info!(path = %dest.display(), size = bytes.len(), "Stored blob");
                    Ok(FsBlobStore::locator_for(&dest))
                }
                Err(e) => {
                    tracing::warn!(path = %dest.display(), error = %e, "Blob write failed");
                    Err(ClipsyncError::transfer_failed(reporter.path(), e.to_string()))
                }
            };
            reporter.finish(result);
        });

        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, path: &str) -> ClipsyncResult<()> {
        let file = self.object_file(path)?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                tracing::debug!(path = %file.display(), "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_chunked(
    reporter: &UploadReporter,
    dest: &Path,
    bytes: &[u8],
    chunk_size: usize,
) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let total = bytes.len() as u64;
    let part = dest.with_extension("part");
    let written = async {
        let mut file = tokio::fs::File::create(&part).await?;
        reporter.progress(0, total);
        let mut transferred = 0u64;
        for chunk in bytes.chunks(chunk_size) {
            file.write_all(chunk).await?;
            transferred += chunk.len() as u64;
            reporter.progress(transferred, total);
        }
        file.flush().await?;
        file.sync_all().await?;
        tokio::fs::rename(&part, dest).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&part).await;
    }
    written
}
