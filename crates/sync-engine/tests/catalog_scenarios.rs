//! Catalog reader and gallery scenarios.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_identity::SessionState;
use clipsync_media_model::{Identity, MediaRecord, RecordId};
use clipsync_sync_engine::{
    CatalogReader, Gallery, GalleryState, MemoryBlobStore, MemoryMetadataStore, MetadataStore,
    RecordFilter, RecordOrder, SyncContext, LOAD_FAILED_MESSAGE, VIDEOS_COLLECTION,
};

/// A store that ignores the filter and order it is given and returns its
/// records exactly as seeded.
struct CarelessStore {
    records: Mutex<Vec<MediaRecord>>,
}

#[async_trait::async_trait]
impl MetadataStore for CarelessStore {
    async fn create(&self, _collection: &str, record: &MediaRecord) -> ClipsyncResult<RecordId> {
        let id = RecordId::new(record.client_key.to_string());
        self.records
            .lock()
            .unwrap()
            .push(record.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn query(
        &self,
        _collection: &str,
        _filter: &RecordFilter,
        _order: RecordOrder,
    ) -> ClipsyncResult<Vec<MediaRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }
}

fn context(identity: Option<&str>, records: Arc<dyn MetadataStore>) -> SyncContext {
    let session = match identity {
        Some(id) => SessionState::signed_in(Identity::from(id)),
        None => SessionState::signed_out(),
    };
    SyncContext::new(Arc::new(session), Arc::new(MemoryBlobStore::new()), records)
}

fn record(owner: &str, created_at: i64) -> MediaRecord {
    MediaRecord::new(
        Identity::from(owner),
        created_at,
        format!("https://x/{created_at}.mp4"),
        0,
    )
}

async fn seeded_store(records: &[(&str, i64)]) -> Arc<MemoryMetadataStore> {
    let store = Arc::new(MemoryMetadataStore::new());
    for (owner, ts) in records {
        store
            .create(VIDEOS_COLLECTION, &record(owner, *ts))
            .await
            .unwrap();
    }
    store
}

#[tokio::test]
async fn lists_only_own_records_newest_first() {
    let store = seeded_store(&[("u1", 100), ("u2", 300), ("u1", 200), ("u1", 50)]).await;
    let listed = CatalogReader::new(context(Some("u1"), store))
        .list_owned_records()
        .await
        .unwrap();
    let stamps: Vec<i64> = listed.iter().map(|r| r.created_at).collect();
    assert_eq!(stamps, vec![200, 100, 50]);
    assert!(listed.iter().all(|r| r.owner_id == Identity::from("u1")));
}

#[tokio::test]
async fn foreign_and_unsorted_store_output_is_corrected() {
    let store = Arc::new(CarelessStore {
        records: Mutex::new(Vec::new()),
    });
    for (owner, ts) in [("u1", 1), ("u2", 9), ("u1", 5), ("u3", 7), ("u1", 3)] {
        store.create(VIDEOS_COLLECTION, &record(owner, ts)).await.unwrap();
    }

    let listed = CatalogReader::new(context(Some("u1"), store))
        .list_owned_records()
        .await
        .unwrap();
    let stamps: Vec<i64> = listed.iter().map(|r| r.created_at).collect();
    assert_eq!(stamps, vec![5, 3, 1]);
}

#[tokio::test]
async fn store_errors_surface_as_query_failed() {
    let store = Arc::new(MemoryMetadataStore::new());
    store.fail_queries(true);
    let err = CatalogReader::new(context(Some("u1"), store))
        .list_owned_records()
        .await
        .unwrap_err();
    assert!(matches!(err, ClipsyncError::QueryFailed { .. }));
}

#[tokio::test]
async fn gallery_moves_through_empty_loaded_and_failed() {
    let store = Arc::new(MemoryMetadataStore::new());
    let mut gallery = Gallery::new(CatalogReader::new(context(Some("u1"), store.clone())));
    assert_eq!(gallery.state(), &GalleryState::Loading);

    assert_eq!(gallery.refresh().await, &GalleryState::Empty);

    store
        .create(VIDEOS_COLLECTION, &record("u1", 1000))
        .await
        .unwrap();
    gallery.refresh().await;
    assert_eq!(gallery.state().items().len(), 1);

    store.fail_queries(true);
    assert_eq!(
        gallery.refresh().await,
        &GalleryState::Failed {
            message: LOAD_FAILED_MESSAGE.to_string()
        }
    );

    store.fail_queries(false);
    gallery.refresh().await;
    assert!(matches!(gallery.state(), GalleryState::Loaded(_)));
}

#[tokio::test]
async fn gallery_player_selection() {
    let store = seeded_store(&[("u1", 10), ("u1", 20)]).await;
    let mut gallery = Gallery::new(CatalogReader::new(context(Some("u1"), store)));
    gallery.refresh().await;

    let key = gallery.state().items()[1].list_key();
    let opened = gallery.select(&key).map(|r| r.created_at);
    assert_eq!(opened, Some(10));
    assert_eq!(gallery.playing().map(|r| r.url.as_str()), Some("https://x/10.mp4"));

    gallery.close_player();
    assert!(gallery.playing().is_none());
    assert!(gallery.select("no-such-key").is_none());
}

#[tokio::test]
async fn signed_out_gallery_fails_to_load() {
    let store = Arc::new(MemoryMetadataStore::new());
    let mut gallery = Gallery::new(CatalogReader::new(context(None, store)));
    assert!(matches!(
        gallery.refresh().await,
        GalleryState::Failed { .. }
    ));
}

fn owner_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("u1"), Just("u2"), Just("u3")]
}

proptest! {
    #[test]
    fn catalog_is_owner_filtered_and_descending(
        seeded in proptest::collection::vec((owner_strategy(), 0i64..5_000), 0..30)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let listed = runtime.block_on(async {
            let store = Arc::new(CarelessStore { records: Mutex::new(Vec::new()) });
            for (owner, ts) in &seeded {
                store.create(VIDEOS_COLLECTION, &record(owner, *ts)).await.unwrap();
            }
            CatalogReader::new(context(Some("u1"), store))
                .list_owned_records()
                .await
                .unwrap()
        });

        let expected = seeded.iter().filter(|(owner, _)| *owner == "u1").count();
        prop_assert_eq!(listed.len(), expected);
        prop_assert!(listed.iter().all(|r| r.owner_id == Identity::from("u1")));
        for pair in listed.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
