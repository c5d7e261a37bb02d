//! ClipSync Sync Engine
//!
//! Moves captured clips into durable storage and reads them back:
//!
//! - [`UploadPipeline`]: local clip → resumable blob upload → metadata record
//! - [`CatalogReader`]: every record owned by the current identity, newest first
//! - [`Gallery`]: load/refresh/select state for a gallery front end
//!
//! Storage is reached only through the [`BlobStore`] and [`MetadataStore`]
//! traits. Filesystem-backed and in-memory implementations ship with the crate.
//! All collaborators are injected through a [`SyncContext`].

pub mod blob;
pub mod catalog;
pub mod context;
pub mod fs_blob;
pub mod gallery;
pub mod jsonl_store;
pub mod memory;
pub mod metadata;
pub mod upload;

pub use blob::*;
pub use catalog::CatalogReader;
pub use context::SyncContext;
pub use fs_blob::FsBlobStore;
pub use gallery::*;
pub use jsonl_store::JsonlMetadataStore;
pub use memory::{MemoryBlobStore, MemoryMetadataStore};
pub use metadata::*;
pub use upload::*;
