//! Collaborators shared by the upload pipeline and catalog reader.

use std::sync::Arc;

use clipsync_common::clock::{Clock, SystemClock};
use clipsync_identity::SessionProvider;

use crate::blob::BlobStore;
use crate::metadata::MetadataStore;

/// Explicitly injected collaborators; cheap to clone.
#[derive(Clone)]
pub struct SyncContext {
    pub session: Arc<dyn SessionProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn MetadataStore>,
    pub clock: Arc<dyn Clock>,
}

impl SyncContext {
    /// Context using the system clock.
    pub fn new(
        session: Arc<dyn SessionProvider>,
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            session,
            blobs,
            records,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
