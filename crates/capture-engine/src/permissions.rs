//! Camera + microphone permission gate.

use crate::device::{CameraDevice, PermissionKind, PermissionStatus};
use clipsync_common::error::ClipsyncResult;

/// Combined permission state checked before the capture surface is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionGate {
    /// Not asked yet.
    #[default]
    Unknown,
    /// Camera and microphone both granted.
    Granted,
    /// At least one was refused. The user may ask again.
    Denied,
}

impl PermissionGate {
    pub fn from_statuses(camera: PermissionStatus, microphone: PermissionStatus) -> Self {
        if camera.is_granted() && microphone.is_granted() {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Ask the device for camera and microphone access, one request each.
pub async fn request_capture_permissions(
    device: &dyn CameraDevice,
) -> ClipsyncResult<PermissionGate> {
    let camera = device.request_permission(PermissionKind::Camera).await?;
    let microphone = device.request_permission(PermissionKind::Microphone).await?;
    let gate = PermissionGate::from_statuses(camera, microphone);
    tracing::info!(?camera, ?microphone, ?gate, "Capture permissions checked");
    Ok(gate)
}
