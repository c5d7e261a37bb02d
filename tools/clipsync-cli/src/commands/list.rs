//! List the signed-in account's clips.

use clipsync_sync_engine::{CatalogReader, Gallery, GalleryState, EMPTY_HINT, EMPTY_MESSAGE};

use crate::app::App;

pub async fn run(app: &App) -> anyhow::Result<()> {
    if !app.is_signed_in() {
        anyhow::bail!("Not signed in; run `clipsync login` first");
    }

    let mut gallery = Gallery::new(CatalogReader::new(app.sync_context()?));
    match gallery.refresh().await {
        GalleryState::Loading => {}
        GalleryState::Failed { message } => anyhow::bail!(message.clone()),
        GalleryState::Empty => {
            println!("{EMPTY_MESSAGE}");
            println!("{EMPTY_HINT}");
        }
        GalleryState::Loaded(items) => {
            println!("My Videos ({})", items.len());
            println!("{}", "-".repeat(60));
            for item in items {
                println!("  {}  {}", item.date_label(), item.title);
                println!("    {} bytes  {}", item.file_size, item.url);
            }
        }
    }
    Ok(())
}
