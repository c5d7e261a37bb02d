//! Record a clip from the camera.

use std::sync::Arc;

use clipsync_capture_engine::{
    CaptureController, CaptureEvent, Facing, GstCameraDevice, RECORDING_SAVED_MESSAGE,
};

use crate::app::App;
use crate::commands::upload::upload_clip;

pub async fn run(app: &App, front: bool, upload: bool) -> anyhow::Result<()> {
    if upload && !app.is_signed_in() {
        anyhow::bail!("Not signed in; run `clipsync login` first or pass --no-upload");
    }

    let facing = if front { Facing::Front } else { Facing::Back };
    let clips_dir = app.config.clips_dir();
    let device = Arc::new(GstCameraDevice::new(&app.config.capture, clips_dir.clone()));
    let mut controller = CaptureController::with_facing(device, facing);

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CaptureEvent::RecordingFailed { message } => {
                    tracing::warn!(%message, "Recording failed")
                }
                other => tracing::debug!(?other, "Capture event"),
            }
        }
    });

    let gate = controller.ensure_permissions().await?;
    if !gate.is_granted() {
        anyhow::bail!(
            "Camera and microphone access are required to record. Run `clipsync check` for details."
        );
    }

    let handle = controller.bind().await?;
    println!("Starting recording");
    println!("  Camera: {} ({})", handle.facing, handle.source);
    println!("  Output: {}", clips_dir.display());
    println!();

    controller.start_recording().await?;
    println!("Press Ctrl+C to stop recording...");
    tokio::signal::ctrl_c().await?;

    println!();
    let clip = controller.stop_recording().await?.wait().await?;
    println!("{RECORDING_SAVED_MESSAGE}");
    println!("Saved to: {}", clip.path.display());

    if upload {
        let record = upload_clip(app, &clip.uri).await?;
        println!("Uploaded: {}", record.title);
    }
    Ok(())
}
