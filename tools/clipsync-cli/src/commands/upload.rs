//! Upload an existing clip.

use std::io::Write;

use clipsync_media_model::MediaRecord;
use clipsync_sync_engine::UploadPipeline;

use crate::app::App;

/// Upload `local_uri` with a progress line on stdout.
pub async fn upload_clip(app: &App, local_uri: &str) -> anyhow::Result<MediaRecord> {
    let pipeline = UploadPipeline::new(app.sync_context()?);
    let record = pipeline
        .save_with_progress(local_uri, |progress| {
            print!(
                "\rUploading... {:>3.0}% ({}/{} bytes)",
                progress.percent(),
                progress.transferred,
                progress.total
            );
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();
    Ok(record?)
}

pub async fn run(app: &App, path: &str) -> anyhow::Result<()> {
    if !app.is_signed_in() {
        anyhow::bail!("Not signed in; run `clipsync login` first");
    }
    let record = upload_clip(app, path).await?;
    println!("Uploaded: {}", record.title);
    println!("  Id:  {}", record.list_key());
    println!("  URL: {}", record.url);
    Ok(())
}
