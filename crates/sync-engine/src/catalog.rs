//! Catalog reader: the current identity's clips, newest first.

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_media_model::{newest_first, MediaRecord};

use crate::context::SyncContext;
use crate::metadata::{RecordFilter, RecordOrder, VIDEOS_COLLECTION};

#[derive(Clone)]
pub struct CatalogReader {
    ctx: SyncContext,
}

impl CatalogReader {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Every record owned by the current identity, ordered by `createdAt`
    /// descending. Returns the full set in one response.
    ///
    /// The store is asked to filter and order, and the result is checked
    /// again here: records owned by anyone else are dropped and the order is
    /// re-established with a stable sort.
    #[tracing::instrument(skip(self))]
    pub async fn list_owned_records(&self) -> ClipsyncResult<Vec<MediaRecord>> {
        let owner = self
            .ctx
            .session
            .current_identity()
            .ok_or(ClipsyncError::NotAuthenticated)?;

        let records = self
            .ctx
            .records
            .query(
                VIDEOS_COLLECTION,
                &RecordFilter::OwnerIs(owner.clone()),
                RecordOrder::CreatedAtDesc,
            )
            .await
            .map_err(|e| {
                tracing::error!(%owner, error = %e, "Catalog query failed");
                match e {
                    ClipsyncError::QueryFailed { .. } => e,
                    other => ClipsyncError::query_failed(other.to_string()),
                }
            })?;

        let returned = records.len();
        let mut owned: Vec<MediaRecord> = records
            .into_iter()
            .filter(|r| r.is_owned_by(&owner))
            .collect();
        if owned.len() != returned {
            tracing::warn!(
                %owner,
                dropped = returned - owned.len(),
                "Store returned records owned by another identity"
            );
        }

        owned.sort_by(newest_first);
        tracing::debug!(%owner, count = owned.len(), "Catalog loaded");
        Ok(owned)
    }
}
