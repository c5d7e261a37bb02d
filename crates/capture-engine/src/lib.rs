//! ClipSync Capture Engine
//!
//! Mediates recording sessions against a camera device. The controller owns
//! the session state machine; devices only know how to bind, start and
//! finalize a clip.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               CaptureController                │
//! │  PermissionGate   Facing   CaptureState        │
//! │        │             │          │              │
//! │        ▼             ▼          ▼              │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │      dyn CameraDevice (GstCameraDevice)  │  │
//! │  │  v4l2src + autoaudiosrc ─► clip-*.mp4    │  │
//! │  └─────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────┘
//!                       │ PendingClip
//!                       ▼
//!               upload pipeline (sync-engine)
//! ```

pub mod capabilities;
pub mod controller;
pub mod device;
pub mod gst_device;
pub mod permissions;
pub mod pipeline;

pub use controller::*;
pub use device::*;
pub use gst_device::GstCameraDevice;
pub use permissions::*;
