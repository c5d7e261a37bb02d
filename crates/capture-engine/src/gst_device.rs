//! V4L2 camera device recorded through GStreamer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use clipsync_common::config::CaptureDefaults;
use clipsync_common::error::{ClipsyncError, ClipsyncResult};

use crate::device::{
    CameraDevice, CapturedClip, ClipReceiver, DeviceHandle, Facing, PermissionKind,
    PermissionStatus,
};
use crate::pipeline::{camera_launch_line, find_camera_node, GstRecorder};

struct ActiveRecording {
    handle_id: u64,
    recorder: GstRecorder,
    path: PathBuf,
    done: oneshot::Sender<ClipsyncResult<CapturedClip>>,
}

/// Records from `/dev/videoN` nodes into MP4 files.
pub struct GstCameraDevice {
    devices: HashMap<Facing, String>,
    output_dir: PathBuf,
    fps: u32,
    next_handle: AtomicU64,
    active: Mutex<Option<ActiveRecording>>,
}

impl GstCameraDevice {
    pub fn new(capture: &CaptureDefaults, output_dir: impl Into<PathBuf>) -> Self {
        let devices = HashMap::from([
            (Facing::Front, capture.front_device.clone()),
            (Facing::Back, capture.back_device.clone()),
        ]);
        Self {
            devices,
            output_dir: output_dir.into(),
            fps: capture.fps,
            next_handle: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    /// Device node for `facing`, falling back to the best detected node.
    pub fn resolve_source(&self, facing: Facing) -> Option<String> {
        self.devices
            .get(&facing)
            .filter(|node| Path::new(node.as_str()).exists())
            .cloned()
            .or_else(|| {
                tracing::debug!(%facing, "Configured camera node missing; searching");
                find_camera_node(facing)
            })
    }

    fn clip_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        self.output_dir.join(format!("clip-{stamp}.mp4"))
    }

    fn lock_active(&self) -> ClipsyncResult<std::sync::MutexGuard<'_, Option<ActiveRecording>>> {
        self.active
            .lock()
            .map_err(|_| ClipsyncError::capture("Camera recorder state poisoned"))
    }
}

#[async_trait::async_trait]
impl CameraDevice for GstCameraDevice {
    async fn request_permission(&self, kind: PermissionKind) -> ClipsyncResult<PermissionStatus> {
        let granted = match kind {
            PermissionKind::Camera => [Facing::Back, Facing::Front]
                .into_iter()
                .filter_map(|facing| self.resolve_source(facing))
                .any(|node| std::fs::File::open(&node).is_ok()),
            PermissionKind::Microphone => microphone_available(),
        };
        Ok(if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn bind(&self, facing: Facing) -> ClipsyncResult<DeviceHandle> {
        let source = self.resolve_source(facing).ok_or_else(|| {
            ClipsyncError::capture(format!(
                "No {facing} camera found (expected a /dev/video* node)"
            ))
        })?;
        Ok(DeviceHandle {
            id: self.next_handle.fetch_add(1, Ordering::SeqCst),
            facing,
            source,
        })
    }

    async fn start_recording(&self, handle: &DeviceHandle) -> ClipsyncResult<ClipReceiver> {
        let busy = self.lock_active()?.is_some();
        if busy {
            return Err(ClipsyncError::capture("Camera is already recording"));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.clip_path();
        let launch = camera_launch_line(&handle.source, &path, self.fps, microphone_available());
        tracing::debug!(%launch, "Building camera pipeline");

        let mut recorder = GstRecorder::from_launch(format!("camera-{}", handle.facing), &launch)?;
        let recorder = tokio::task::spawn_blocking(move || recorder.start().map(|()| recorder))
            .await
            .map_err(|e| ClipsyncError::capture(format!("Camera start task failed: {e}")))??;

        let (done, rx) = oneshot::channel();
        *self.lock_active()? = Some(ActiveRecording {
            handle_id: handle.id,
            recorder,
            path,
            done,
        });
        Ok(rx)
    }

    async fn stop_recording(&self, handle: &DeviceHandle) -> ClipsyncResult<()> {
        let active = {
            let mut guard = self.lock_active()?;
            match guard.take() {
                Some(active) if active.handle_id == handle.id => active,
                Some(other) => {
                    *guard = Some(other);
                    return Err(ClipsyncError::capture(
                        "Recording belongs to a different camera binding",
                    ));
                }
                None => return Err(ClipsyncError::capture("Camera is not recording")),
            }
        };

        // Finalization runs in the background; the clip is delivered on `done`.
        tokio::task::spawn_blocking(move || {
            let ActiveRecording {
                mut recorder,
                path,
                done,
                ..
            } = active;
            let result = recorder.stop().map(|()| CapturedClip::from_path(path));
            if let Err(ref e) = result {
                tracing::error!(error = %e, "Camera finalize failed");
            }
            let _ = done.send(result);
        });
        Ok(())
    }
}

/// A PipeWire/PulseAudio socket or an ALSA device directory is present.
pub fn microphone_available() -> bool {
    let runtime_sockets = std::env::var("XDG_RUNTIME_DIR")
        .map(|dir| {
            let dir = PathBuf::from(dir);
            dir.join("pipewire-0").exists() || dir.join("pulse").join("native").exists()
        })
        .unwrap_or(false);
    runtime_sockets || Path::new("/dev/snd").exists()
}
