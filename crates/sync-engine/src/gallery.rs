//! Gallery view model.
//!
//! Holds what a gallery front end renders: a loading indicator, an error
//! with a retry, an empty placeholder, or the list of clips, plus the clip
//! currently open in the player.

use clipsync_media_model::MediaRecord;

use crate::catalog::CatalogReader;

pub const LOAD_FAILED_MESSAGE: &str = "Could not load videos. Please try again.";
pub const EMPTY_MESSAGE: &str = "No videos found";
pub const EMPTY_HINT: &str = "Start recording to see your videos here";

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryState {
    Loading,
    /// Retry with [`Gallery::refresh`].
    Failed { message: String },
    Empty,
    Loaded(Vec<MediaRecord>),
}

impl GalleryState {
    pub fn items(&self) -> &[MediaRecord] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }
}

pub struct Gallery {
    catalog: CatalogReader,
    state: GalleryState,
    playing: Option<MediaRecord>,
}

impl Gallery {
    /// A gallery that has not loaded yet. Call [`refresh`](Self::refresh).
    pub fn new(catalog: CatalogReader) -> Self {
        Self {
            catalog,
            state: GalleryState::Loading,
            playing: None,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    /// Reload the catalog. Also serves as "try again" after a failure.
    pub async fn refresh(&mut self) -> &GalleryState {
        self.state = GalleryState::Loading;
        self.state = match self.catalog.list_owned_records().await {
            Ok(items) if items.is_empty() => GalleryState::Empty,
            Ok(items) => GalleryState::Loaded(items),
            Err(e) => {
                tracing::error!(error = %e, "Gallery load failed");
                GalleryState::Failed {
                    message: LOAD_FAILED_MESSAGE.to_string(),
                }
            }
        };

        // The open clip may have disappeared from the reloaded list.
        if let Some(open) = &self.playing {
            let key = open.list_key();
            if !self.state.items().iter().any(|r| r.list_key() == key) {
                self.playing = None;
            }
        }
        &self.state
    }

    /// Open the clip with `key` (see [`MediaRecord::list_key`]) in the player.
    pub fn select(&mut self, key: &str) -> Option<&MediaRecord> {
        let found = self
            .state
            .items()
            .iter()
            .find(|r| r.list_key() == key)
            .cloned();
        self.playing = found;
        self.playing.as_ref()
    }

    pub fn playing(&self) -> Option<&MediaRecord> {
        self.playing.as_ref()
    }

    pub fn close_player(&mut self) {
        self.playing = None;
    }
}
