//! ClipSync Common Utilities
//!
//! Shared infrastructure for all ClipSync crates:
//! - Error taxonomy and result alias
//! - Wall clock abstraction used to stamp captures
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
