//! Wiring of the configured backends.

use std::sync::Arc;

use anyhow::Context;

use clipsync_common::config::AppConfig;
use clipsync_identity::{LocalAuthProvider, SessionProvider};
use clipsync_sync_engine::{FsBlobStore, JsonlMetadataStore, SyncContext};

pub struct App {
    pub config: AppConfig,
    pub auth: Arc<LocalAuthProvider>,
}

impl App {
    pub fn open(config: AppConfig) -> anyhow::Result<Self> {
        let auth = LocalAuthProvider::open(config.accounts_path(), config.session_path())
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .with_context(|| format!("opening accounts in {}", config.data_dir.display()))?;
        Ok(Self {
            config,
            auth: Arc::new(auth),
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.current_identity().is_some()
    }

    /// Session, blob store, and metadata store for upload and listing.
    pub fn sync_context(&self) -> anyhow::Result<SyncContext> {
        let blobs = FsBlobStore::new(self.config.blob_root(), self.config.upload.chunk_size)
            .context("opening blob store")?;
        let records =
            JsonlMetadataStore::new(self.config.records_dir()).context("opening record store")?;
        Ok(SyncContext::new(
            self.auth.clone(),
            Arc::new(blobs),
            Arc::new(records),
        ))
    }
}
