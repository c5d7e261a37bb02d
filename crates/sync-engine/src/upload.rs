//! Upload pipeline: local clip → blob store → metadata record.

use std::path::PathBuf;

use uuid::Uuid;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_media_model::{Identity, MediaRecord};

use crate::blob::UploadProgress;
use crate::context::SyncContext;
use crate::metadata::VIDEOS_COLLECTION;

/// Object path for a clip uploaded by `owner` at `timestamp_ms`.
///
/// `client_key` is the record's client token; it keeps two uploads in the
/// same millisecond from sharing an object.
pub fn video_object_path(owner: &Identity, timestamp_ms: i64, client_key: &Uuid) -> String {
    format!("videos/{owner}/{timestamp_ms}-{client_key}.mp4")
}

/// Local filesystem path for a `file://` URI or a plain path.
///
/// URIs are percent-decoded; plain paths are taken as-is.
pub fn local_path_from_uri(local_uri: &str) -> PathBuf {
    let Some(rest) = local_uri.strip_prefix("file://") else {
        return PathBuf::from(local_uri);
    };
    // `file://localhost/x` and `file:///x` both name `/x`.
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    match urlencoding::decode(rest) {
        Ok(decoded) => PathBuf::from(decoded.into_owned()),
        Err(e) => {
            tracing::debug!(uri = %local_uri, error = %e, "URI does not decode to UTF-8, using it raw");
            PathBuf::from(rest)
        }
    }
}

/// Persists captured clips for the current identity.
///
/// Each call is independent: two concurrent saves produce two objects and two
/// records, even within one millisecond. A failed transfer writes no record
/// and is not retried.
#[derive(Clone)]
pub struct UploadPipeline {
    ctx: SyncContext,
}

impl UploadPipeline {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Upload the clip at `local_uri` and record it. Returns the stored record.
    pub async fn save_captured_video(&self, local_uri: &str) -> ClipsyncResult<MediaRecord> {
        self.save_with_progress(local_uri, |_| {}).await
    }

    /// Like [`save_captured_video`](Self::save_captured_video), reporting
    /// transfer progress to `on_progress`.
    #[tracing::instrument(skip(self, on_progress))]
    pub async fn save_with_progress<F>(
        &self,
        local_uri: &str,
        mut on_progress: F,
    ) -> ClipsyncResult<MediaRecord>
    where
        F: FnMut(UploadProgress) + Send,
    {
        let owner = self
            .ctx
            .session
            .current_identity()
            .ok_or(ClipsyncError::NotAuthenticated)?;

        let created_at = self.ctx.clock.now_ms();
        let local_path = local_path_from_uri(local_uri);

        let file_size = match tokio::fs::metadata(&local_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::debug!(path = %local_path.display(), error = %e, "Clip size unavailable");
                0
            }
        };

        let bytes = tokio::fs::read(&local_path).await.map_err(|e| {
            tracing::error!(path = %local_path.display(), error = %e, "Failed to read clip");
            if e.kind() == std::io::ErrorKind::NotFound {
                ClipsyncError::FileNotFound {
                    path: local_path.clone(),
                }
            } else {
                ClipsyncError::Io(e)
            }
        })?;

        let client_key = Uuid::new_v4();
        let object_path = video_object_path(&owner, created_at, &client_key);
        tracing::info!(%owner, path = %object_path, size = bytes.len(), "Uploading clip");

        let mut task = self
            .ctx
            .blobs
            .begin_resumable_upload(&object_path, bytes)
            .await
            .map_err(|e| as_transfer_failure(&object_path, e))?;

        while let Some(progress) = task.next_progress().await {
            tracing::debug!(
                path = %object_path,
                transferred = progress.transferred,
                total = progress.total,
                "Upload is {:.0}% done",
                progress.percent()
            );
            on_progress(progress);
        }

        let url = task
            .finish()
            .await
            .map_err(|e| as_transfer_failure(&object_path, e))?;

        let record = MediaRecord::new(owner, created_at, url, file_size).with_client_key(client_key);
        match self.ctx.records.create(VIDEOS_COLLECTION, &record).await {
            Ok(id) => {
                tracing::info!(%id, path = %object_path, "Clip saved");
                Ok(record.with_id(id))
            }
            Err(e) => {
                tracing::error!(path = %object_path, error = %e, "Failed to write clip record");
                self.discard_orphan(&object_path).await;
                Err(ClipsyncError::record_write_failed(object_path, e.to_string()))
            }
        }
    }

    /// One best-effort delete of an object whose record could not be written.
    async fn discard_orphan(&self, object_path: &str) {
        match self.ctx.blobs.delete(object_path).await {
            Ok(()) => tracing::info!(path = %object_path, "Removed orphaned clip"),
            Err(e) => tracing::warn!(
                path = %object_path,
                error = %e,
                "Orphaned clip left in blob store"
            ),
        }
    }
}

fn as_transfer_failure(object_path: &str, err: ClipsyncError) -> ClipsyncError {
    tracing::error!(path = %object_path, error = %err, "Clip transfer failed");
    match err {
        ClipsyncError::TransferFailed { .. } => err,
        other => ClipsyncError::transfer_failed(object_path, other.to_string()),
    }
}
