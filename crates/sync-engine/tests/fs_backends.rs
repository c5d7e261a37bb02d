//! End-to-end save and list against the filesystem backends.

use std::path::PathBuf;
use std::sync::Arc;

use clipsync_common::clock::ManualClock;
use clipsync_identity::SessionState;
use clipsync_media_model::Identity;
use clipsync_sync_engine::{
    CatalogReader, FsBlobStore, JsonlMetadataStore, SyncContext, UploadPipeline,
};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("clipsync_fs_backends_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn save_and_list_survive_reopening_the_stores() {
    let dir = temp_dir("reopen");
    let clip = dir.join("clip.mp4");
    std::fs::write(&clip, vec![1u8; 1000]).unwrap();

    let session = SessionState::signed_in(Identity::from("u1"));
    let clock = ManualClock::new(1_700_000_000_000);

    let ctx = SyncContext::new(
        Arc::new(session.clone()),
        Arc::new(FsBlobStore::new(dir.join("blobs"), 256).unwrap()),
        Arc::new(JsonlMetadataStore::new(dir.join("records")).unwrap()),
    )
    .with_clock(Arc::new(clock.clone()));

    let pipeline = UploadPipeline::new(ctx);
    let first = pipeline
        .save_captured_video(&format!("file://{}", clip.display()))
        .await
        .unwrap();
    clock.advance(60_000);
    let second = pipeline
        .save_captured_video(clip.to_str().unwrap())
        .await
        .unwrap();

    assert!(first.url.starts_with("file://"));
    assert!(first.url.ends_with(&format!(
        "videos/u1/1700000000000-{}.mp4",
        first.client_key
    )));
    assert_eq!(first.file_size, 1000);

    // Fresh handles over the same directories.
    let reopened = SyncContext::new(
        Arc::new(session),
        Arc::new(FsBlobStore::new(dir.join("blobs"), 256).unwrap()),
        Arc::new(JsonlMetadataStore::new(dir.join("records")).unwrap()),
    );
    let listed = CatalogReader::new(reopened)
        .list_owned_records()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    let stored = listed[1].url.trim_start_matches("file://");
    assert_eq!(std::fs::read(stored).unwrap().len(), 1000);
    assert_eq!(listed[1].client_key, first.client_key);
}

#[tokio::test]
async fn same_millisecond_saves_get_separate_files() {
    let dir = temp_dir("same_ms");
    let first_clip = dir.join("a.mp4");
    let second_clip = dir.join("b.mp4");
    std::fs::write(&first_clip, vec![1u8; 300]).unwrap();
    std::fs::write(&second_clip, vec![2u8; 500]).unwrap();

    let ctx = SyncContext::new(
        Arc::new(SessionState::signed_in(Identity::from("u1"))),
        Arc::new(FsBlobStore::new(dir.join("blobs"), 64).unwrap()),
        Arc::new(JsonlMetadataStore::new(dir.join("records")).unwrap()),
    )
    .with_clock(Arc::new(ManualClock::new(42)));
    let pipeline = UploadPipeline::new(ctx);

    let (first_uri, second_uri) = (
        first_clip.to_str().unwrap().to_string(),
        second_clip.to_str().unwrap().to_string(),
    );
    let (a, b) = tokio::join!(
        pipeline.save_captured_video(&first_uri),
        pipeline.save_captured_video(&second_uri),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.url, b.url);
    let a_bytes = std::fs::read(a.url.trim_start_matches("file://")).unwrap();
    let b_bytes = std::fs::read(b.url.trim_start_matches("file://")).unwrap();
    assert_eq!(a_bytes, vec![1u8; 300]);
    assert_eq!(b_bytes, vec![2u8; 500]);
}
