//! SurfTrack Data Model
//!
//! Defines the data contracts shared by the pipeline and its collaborators:
//! - **Detections:** Per-frame tracked-person boxes with optional pose landmarks
//! - **Maneuvers:** Turn metrics, feature snapshots, and classified events
//! - **Session:** On-disk output layout, per-track records, and merging
//!
//! Pixel coordinates are in the (rotation-corrected) frame space; landmark
//! coordinates are normalized to `[0.0, 1.0]` relative to the detection box.

pub mod detection;
pub mod geometry;
pub mod maneuver;
pub mod merge;
pub mod session;

pub use detection::*;
pub use geometry::*;
pub use maneuver::*;
pub use merge::*;
pub use session::*;
