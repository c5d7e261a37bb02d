//! Camera device contract.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};

/// Which physical camera a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Front,
    #[default]
    Back,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// A capability the device asks the user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Camera,
    Microphone,
}

/// Answer to a single permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// A device bound for a given facing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Unique per bind call.
    pub id: u64,
    pub facing: Facing,
    /// Backend-specific source locator, e.g. `/dev/video0`.
    pub source: String,
}

/// A finalized recording on local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedClip {
    /// `file://` URI handed to the upload pipeline.
    pub uri: String,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

impl CapturedClip {
    pub fn from_path(path: PathBuf) -> Self {
        let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
        Self {
            uri: format!("file://{}", path.display()),
            path,
            size_bytes,
        }
    }
}

/// Delivers the finished clip once the device has finalized it.
pub type ClipReceiver = oneshot::Receiver<ClipsyncResult<CapturedClip>>;

/// Abstract interface for a camera device.
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    /// Ask for one capability. Repeated calls are allowed.
    async fn request_permission(&self, kind: PermissionKind) -> ClipsyncResult<PermissionStatus>;

    /// Bind the camera for `facing`.
    async fn bind(&self, facing: Facing) -> ClipsyncResult<DeviceHandle>;

    /// Begin recording on `handle`.
    ///
    /// Resolves once the device has acknowledged the start. The returned
    /// receiver yields the clip after [`stop_recording`](Self::stop_recording).
    async fn start_recording(&self, handle: &DeviceHandle) -> ClipsyncResult<ClipReceiver>;

    /// Signal the device to finalize the current clip. Does not wait for
    /// finalization to complete.
    async fn stop_recording(&self, handle: &DeviceHandle) -> ClipsyncResult<()>;
}

/// A clip that is still being finalized by the device.
#[derive(Debug)]
pub struct PendingClip {
    rx: ClipReceiver,
}

impl PendingClip {
    pub(crate) fn new(rx: ClipReceiver) -> Self {
        Self { rx }
    }

    /// Wait for the device to hand over the finished clip.
    pub async fn wait(self) -> ClipsyncResult<CapturedClip> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(ClipsyncError::capture(
                "Camera device dropped the recording before finalizing it",
            )),
        }
    }
}
