//! Capture session control.

use std::sync::Arc;

use tokio::sync::broadcast;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};

use crate::device::{CameraDevice, ClipReceiver, DeviceHandle, Facing, PendingClip};
use crate::permissions::{request_capture_permissions, PermissionGate};

/// Notification shown after a recording is stopped.
pub const RECORDING_SAVED_MESSAGE: &str = "Video recorded successfully!";

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// State of the capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture session.
    Idle,
    /// Start requested; waiting for the device to acknowledge.
    Starting,
    /// Device confirmed the recording is running.
    Recording,
}

/// Something a front end may want to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    PermissionsChanged(PermissionGate),
    FacingChanged(Facing),
    DeviceBound(Facing),
    RecordingRequested,
    RecordingStarted,
    RecordingFailed { message: String },
    /// User-visible success notification.
    RecordingSaved { message: String },
}

/// Drives one camera device through `Idle -> Starting -> Recording -> Idle`.
pub struct CaptureController {
    device: Arc<dyn CameraDevice>,
    facing: Facing,
    permissions: PermissionGate,
    handle: Option<DeviceHandle>,
    state: CaptureState,
    clip_rx: Option<ClipReceiver>,
    rebind_after_stop: bool,
    events: broadcast::Sender<CaptureEvent>,
}

impl CaptureController {
    pub fn new(device: Arc<dyn CameraDevice>) -> Self {
        Self::with_facing(device, Facing::default())
    }

    pub fn with_facing(device: Arc<dyn CameraDevice>, facing: Facing) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            device,
            facing,
            permissions: PermissionGate::Unknown,
            handle: None,
            state: CaptureState::Idle,
            clip_rx: None,
            rebind_after_stop: false,
            events,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state != CaptureState::Idle
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn permissions(&self) -> PermissionGate {
        self.permissions
    }

    pub fn handle(&self) -> Option<&DeviceHandle> {
        self.handle.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    /// Request camera and microphone access. Safe to call again after a denial.
    pub async fn ensure_permissions(&mut self) -> ClipsyncResult<PermissionGate> {
        let gate = request_capture_permissions(self.device.as_ref()).await?;
        if gate != self.permissions {
            self.permissions = gate;
            self.emit(CaptureEvent::PermissionsChanged(gate));
        }
        Ok(gate)
    }

    /// Bind the device for the current facing.
    pub async fn bind(&mut self) -> ClipsyncResult<&DeviceHandle> {
        if !self.permissions.is_granted() {
            return Err(ClipsyncError::permission_denied(
                "Camera and microphone access are required to record",
            ));
        }
        if self.is_recording() {
            return Err(ClipsyncError::capture(
                "Cannot rebind the camera during a capture session",
            ));
        }

        let handle = self.device.bind(self.facing).await?;
        tracing::info!(facing = %handle.facing, source = %handle.source, "Camera bound");
        self.emit(CaptureEvent::DeviceBound(handle.facing));
        Ok(self.handle.insert(handle))
    }

    /// Flip between front and back cameras.
    ///
    /// An in-flight recording keeps its device; the rebind happens when the
    /// session ends.
    pub async fn toggle_facing(&mut self) -> ClipsyncResult<Facing> {
        self.facing = self.facing.flipped();
        self.emit(CaptureEvent::FacingChanged(self.facing));

        if self.handle.is_some() {
            if self.is_recording() {
                tracing::debug!(facing = %self.facing, "Facing change deferred until recording stops");
                self.rebind_after_stop = true;
            } else {
                self.bind().await?;
            }
        }
        Ok(self.facing)
    }

    /// Start a capture session.
    ///
    /// The state becomes `Starting` immediately and is confirmed or reverted
    /// once the device answers.
    pub async fn start_recording(&mut self) -> ClipsyncResult<()> {
        let Some(handle) = self.handle.clone() else {
            return Err(ClipsyncError::capture("No camera bound"));
        };
        if self.state != CaptureState::Idle {
            return Err(ClipsyncError::capture("Recording already in progress"));
        }

        self.state = CaptureState::Starting;
        self.emit(CaptureEvent::RecordingRequested);

        match self.device.start_recording(&handle).await {
            Ok(rx) => {
                self.clip_rx = Some(rx);
                self.state = CaptureState::Recording;
                tracing::info!(facing = %handle.facing, "Recording started");
                self.emit(CaptureEvent::RecordingStarted);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to start recording");
                self.state = CaptureState::Idle;
                self.emit(CaptureEvent::RecordingFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Stop the capture session.
    ///
    /// Returns as soon as the device has been told to finalize. Await the
    /// returned [`PendingClip`] for the finished file.
    pub async fn stop_recording(&mut self) -> ClipsyncResult<PendingClip> {
        if self.state != CaptureState::Recording {
            return Err(ClipsyncError::capture("Not recording"));
        }
        let (Some(handle), Some(rx)) = (self.handle.clone(), self.clip_rx.take()) else {
            self.state = CaptureState::Idle;
            return Err(ClipsyncError::capture("Recording has no active device"));
        };

        if let Err(e) = self.device.stop_recording(&handle).await {
            // The device is still capturing; keep the receiver so stop can be retried.
            self.clip_rx = Some(rx);
            tracing::error!(error = %e, "Failed to stop recording");
            self.emit(CaptureEvent::RecordingFailed {
                message: e.to_string(),
            });
            return Err(e);
        }
        self.state = CaptureState::Idle;

        tracing::info!("Recording stopped");
        self.emit(CaptureEvent::RecordingSaved {
            message: RECORDING_SAVED_MESSAGE.to_string(),
        });

        if std::mem::take(&mut self.rebind_after_stop) {
            let rebound = self.bind().await.map(|_| ());
            if let Err(e) = rebound {
                tracing::warn!(error = %e, facing = %self.facing, "Deferred rebind failed");
            }
        }

        Ok(PendingClip::new(rx))
    }

    fn emit(&self, event: CaptureEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
