//! Blob store contract and resumable upload handles.

use tokio::sync::{mpsc, oneshot};

use clipsync_common::error::{ClipsyncError, ClipsyncResult};

/// Storage for clip bytes, addressed by slash-separated object paths.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Start transferring `bytes` to `path`.
    ///
    /// Returns once the transfer is accepted. Progress and the terminal
    /// outcome are delivered through the returned [`UploadTask`].
    async fn begin_resumable_upload(&self, path: &str, bytes: Vec<u8>) -> ClipsyncResult<UploadTask>;

    /// Remove the object at `path`. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> ClipsyncResult<()>;
}

/// One progress observation of an in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub transferred: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Completion in percent; an empty transfer counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.transferred as f64 / self.total as f64 * 100.0
        }
    }
}

/// Handle to an in-flight upload.
///
/// Drain [`next_progress`](Self::next_progress) until it yields `None`, then
/// call [`finish`](Self::finish) for the retrieval locator.
pub struct UploadTask {
    path: String,
    progress: mpsc::UnboundedReceiver<UploadProgress>,
    outcome: oneshot::Receiver<ClipsyncResult<String>>,
}

impl UploadTask {
    /// Create a task together with the reporter a backend drives it with.
    pub fn channel(path: impl Into<String>) -> (UploadReporter, UploadTask) {
        let path = path.into();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        (
            UploadReporter {
                path: path.clone(),
                progress: progress_tx,
                outcome: outcome_tx,
            },
            UploadTask {
                path,
                progress: progress_rx,
                outcome: outcome_rx,
            },
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next progress observation, or `None` once the backend stops reporting.
    pub async fn next_progress(&mut self) -> Option<UploadProgress> {
        self.progress.recv().await
    }

    /// Wait for the terminal outcome: the retrieval locator or the failure.
    pub async fn finish(self) -> ClipsyncResult<String> {
        match self.outcome.await {
            Ok(result) => result,
            Err(_) => Err(ClipsyncError::transfer_failed(
                self.path,
                "upload was abandoned before completing",
            )),
        }
    }
}

/// Backend side of an [`UploadTask`].
pub struct UploadReporter {
    path: String,
    progress: mpsc::UnboundedSender<UploadProgress>,
    outcome: oneshot::Sender<ClipsyncResult<String>>,
}

impl UploadReporter {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn progress(&self, transferred: u64, total: u64) {
        // The caller may have stopped listening; progress is advisory.
        let _ = self.progress.send(UploadProgress { transferred, total });
    }

    /// Deliver the terminal outcome. Closes the progress stream.
    pub fn finish(self, result: ClipsyncResult<String>) {
        let UploadReporter { progress, outcome, .. } = self;
        drop(progress);
        let _ = outcome.send(result);
    }
}

/// Reject paths that could escape a backend's namespace.
pub fn validate_object_path(path: &str) -> ClipsyncResult<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        Err(ClipsyncError::transfer_failed(path, "invalid object path"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_empty_transfers() {
        let empty = UploadProgress {
            transferred: 0,
            total: 0,
        };
        assert_eq!(empty.percent(), 100.0);
        let half = UploadProgress {
            transferred: 50,
            total: 200,
        };
        assert_eq!(half.percent(), 25.0);
    }

    #[test]
    fn object_paths_are_validated() {
        assert!(validate_object_path("videos/u1/1000.mp4").is_ok());
        assert!(validate_object_path("").is_err());
        assert!(validate_object_path("/abs/path").is_err());
        assert!(validate_object_path("videos/../etc").is_err());
        assert!(validate_object_path("videos//x").is_err());
    }

    #[tokio::test]
    async fn task_streams_progress_then_outcome() {
        let (reporter, mut task) = UploadTask::channel("videos/u1/1.mp4");
        reporter.progress(0, 10);
        reporter.progress(10, 10);
        reporter.finish(Ok("memory://videos/u1/1.mp4".to_string()));

        let mut seen = Vec::new();
        while let Some(p) = task.next_progress().await {
            seen.push(p.transferred);
        }
        assert_eq!(seen, vec![0, 10]);
        assert_eq!(task.finish().await.unwrap(), "memory://videos/u1/1.mp4");
    }

    #[tokio::test]
    async fn dropped_reporter_fails_the_task() {
        let (reporter, task) = UploadTask::channel("videos/u1/2.mp4");
        drop(reporter);
        let err = task.finish().await.unwrap_err();
        assert!(matches!(err, ClipsyncError::TransferFailed { .. }));
    }
}
