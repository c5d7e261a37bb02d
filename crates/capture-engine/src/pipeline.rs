//! GStreamer pipeline construction for camera recording.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use gst::prelude::*;
use gstreamer as gst;

use crate::device::Facing;

/// Elements a camera recording pipeline needs, checked by `clipsync check`.
pub const REQUIRED_ELEMENTS: &[&str] = &[
    "v4l2src",
    "autoaudiosrc",
    "x264enc",
    "avenc_aac",
    "mp4mux",
];

/// One running (or ready) GStreamer recording pipeline.
pub struct GstRecorder {
    name: String,
    pipeline: gst::Pipeline,
    running: bool,
}

impl GstRecorder {
    pub fn from_launch(name: impl Into<String>, launch: &str) -> ClipsyncResult<Self> {
        init_gstreamer()?;

        let element = gst::parse::launch(launch)
            .map_err(|e| ClipsyncError::capture(format!("Failed to build pipeline: {e}")))?;

        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| ClipsyncError::capture("Launch string did not produce a pipeline"))?;

        Ok(Self {
            name: name.into(),
            pipeline,
            running: false,
        })
    }

    /// Move to Playing and wait (up to 10s) until the source is open.
    pub fn start(&mut self) -> ClipsyncResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            ClipsyncError::capture(format!("Failed to start {} pipeline: {e:?}", self.name))
        })?;

        match self.pipeline.state(gst::ClockTime::from_seconds(10)) {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(
                    pipeline = %self.name,
                    ?state,
                    "Pipeline did not reach Playing state within timeout"
                );
            }
            (Err(e), _, _) => {
                self.pipeline.set_state(gst::State::Null).ok();
                return Err(ClipsyncError::capture(format!(
                    "{} pipeline failed to reach Playing state: {e:?}",
                    self.name
                )));
            }
        }

        self.running = true;
        Ok(())
    }

    /// Send EOS, drain the bus so the muxer writes its index, then tear down.
    ///
    /// Blocks for up to 10 seconds; call from a blocking context.
    pub fn stop(&mut self) -> ClipsyncResult<()> {
        let mut drain_error = None;

        if !self.pipeline.send_event(gst::event::Eos::new()) {
            tracing::warn!(pipeline = %self.name, "Failed to send EOS event; output may be truncated");
        } else if let Some(bus) = self.pipeline.bus() {
            let deadline = Duration::from_secs(10);
            let start = std::time::Instant::now();
            loop {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                    break;
                }
                let remaining = gst::ClockTime::from_nseconds((deadline - elapsed).as_nanos() as u64);
                match bus.timed_pop(remaining) {
                    Some(msg) => match msg.view() {
                        gst::MessageView::Eos(_) => {
                            tracing::debug!(pipeline = %self.name, "EOS received; pipeline drained");
                            break;
                        }
                        gst::MessageView::Error(e) => {
                            tracing::warn!(
                                pipeline = %self.name,
                                error = %e.error(),
                                "Pipeline error during EOS drain"
                            );
                            drain_error = Some(e.error().to_string());
                            break;
                        }
                        _ => {}
                    },
                    None => {
                        tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                        break;
                    }
                }
            }
        }

        self.pipeline.set_state(gst::State::Null).map_err(|e| {
            ClipsyncError::capture(format!("Failed to stop {} pipeline: {e:?}", self.name))
        })?;
        self.running = false;

        match drain_error {
            Some(message) => Err(ClipsyncError::capture(format!(
                "{} pipeline failed while finalizing: {message}",
                self.name
            ))),
            None => Ok(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for GstRecorder {
    fn drop(&mut self) {
        if self.running {
            self.pipeline.set_state(gst::State::Null).ok();
        }
    }
}

/// Launch line recording `device` (and optionally the default microphone)
/// to an MP4 file at `output_path`.
pub fn camera_launch_line(device: &str, output_path: &Path, fps: u32, with_audio: bool) -> String {
    let path = escape_path(output_path);
    let fps = fps.clamp(1, 60);
    // One keyframe every 2 seconds keeps seeking in the gallery player cheap.
    let keyint = fps.saturating_mul(2).max(2);
    let video = format!(
        "v4l2src device=\"{device}\" do-timestamp=true ! queue max-size-buffers=200 leaky=downstream ! videoconvert ! videorate ! video/x-raw,framerate={fps}/1 ! queue max-size-buffers=8 ! x264enc tune=zerolatency speed-preset=veryfast key-int-max={keyint} ! h264parse ! queue ! mux."
    );
    let audio = if with_audio {
        " autoaudiosrc ! audioconvert ! audioresample ! queue ! avenc_aac ! aacparse ! queue ! mux."
    } else {
        ""
    };
    format!("{video}{audio} mp4mux name=mux faststart=true ! filesink location=\"{path}\"")
}

/// Whether GStreamer can create an element named `factory`.
pub fn element_available(factory: &str) -> bool {
    init_gstreamer().is_ok() && gst::ElementFactory::find(factory).is_some()
}

fn init_gstreamer() -> ClipsyncResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(ClipsyncError::capture(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

const SYSFS_VIDEO_ROOT: &str = "/sys/class/video4linux";
const DEV_ROOT: &str = "/dev";
const MAX_VIDEO_NODES: u32 = 16;

/// Words in a sysfs node name that mark a source other than a camera.
const NOT_A_CAMERA: &[&str] = &[
    "metadata", "codec", "encoder", "decoder", "tuner", "dvb", "hdmi", "grabber",
];
const FRONT_HINTS: &[&str] = &["front", "user", "facetime", "integrated", "internal"];
const BACK_HINTS: &[&str] = &["back", "rear", "world", "environment"];
const CAMERA_HINTS: &[&str] = &["cam", "uvc"];

/// How well a node suits the requested facing. Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NodeFit {
    Unnamed,
    OtherSide,
    AnyCamera,
    SameSide,
}

/// Find a V4L2 node for `facing` when the configured one is missing.
pub fn find_camera_node(facing: Facing) -> Option<String> {
    find_camera_node_in(Path::new(SYSFS_VIDEO_ROOT), Path::new(DEV_ROOT), facing)
}

fn find_camera_node_in(sysfs: &Path, dev: &Path, facing: Facing) -> Option<String> {
    let (idx, fit) = (0..MAX_VIDEO_NODES)
        .filter(|idx| dev.join(format!("video{idx}")).exists())
        .filter_map(|idx| {
            let attrs = sysfs.join(format!("video{idx}"));
            let name = std::fs::read_to_string(attrs.join("name"))
                .unwrap_or_default()
                .to_lowercase();
            // UVC exposes a second node per camera for metadata.
            let stream = std::fs::read_to_string(attrs.join("index"))
                .ok()
                .and_then(|raw| raw.trim().parse::<u32>().ok())
                .unwrap_or(0);
            if stream != 0 {
                return None;
            }
            node_fit(name.trim(), facing).map(|fit| (idx, fit))
        })
        // Lowest node number among equal fits.
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))?;

    let node = dev.join(format!("video{idx}")).to_string_lossy().into_owned();
    tracing::info!(%node, %facing, ?fit, "Selected camera node");
    Some(node)
}

fn node_fit(name: &str, facing: Facing) -> Option<NodeFit> {
    let mentions = |words: &[&str]| words.iter().any(|w| name.contains(w));
    if mentions(NOT_A_CAMERA) {
        tracing::debug!(%name, "Ignoring non-camera video node");
        return None;
    }

    let side = match (mentions(FRONT_HINTS), mentions(BACK_HINTS)) {
        (true, false) => Some(Facing::Front),
        (false, true) => Some(Facing::Back),
        _ => None,
    };
    Some(match side {
        Some(side) if side == facing => NodeFit::SameSide,
        Some(_) => NodeFit::OtherSide,
        None if mentions(CAMERA_HINTS) => NodeFit::AnyCamera,
        None => NodeFit::Unnamed,
    })
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}
