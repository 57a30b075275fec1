//! SurfTrack Render Engine
//!
//! Redraws session overlays from the recorded detection log, without
//! running detection again.
//!
//! ```text
//! tracking_data.jsonl ──┐
//!                       ├── allow-list filter (track ids)
//! frames/frame_*.png ───┘         │
//!                                 ├── box + pose skeleton + label
//!                                 ▼
//!                        out/frame_*.png
//! ```

pub mod frames;
pub mod overlay;
pub mod replay;

pub use frames::{FrameSink, FrameSource, ImageDirSink, ImageDirSource};
pub use overlay::{OverlayRenderer, OverlayStyle};
pub use replay::{replay_session, ReplayPlan, ReplayStats};
