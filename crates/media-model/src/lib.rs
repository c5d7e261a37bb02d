//! ClipSync Media Model
//!
//! Defines the data contracts shared by the capture, sync and identity crates:
//! - **Identity:** the opaque handle of an authenticated user
//! - **MediaRecord:** persisted metadata describing one uploaded clip
//!
//! Records are serialized with camelCase field names so documents written by
//! other clients of the same collection stay readable.

pub mod identity;
pub mod record;

pub use identity::*;
pub use record::*;
