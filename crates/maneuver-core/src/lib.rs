//! SurfTrack Maneuver Core
//!
//! Turns a per-frame stream of tracked-person detections into classified
//! surfing maneuvers:
//! - **Signal extraction:** trajectory, smoothed heading, activity accounting, pose features
//! - **Consistency guard:** suppresses detection across tracker identity swaps
//! - **Turn detection:** sustained-direction, magnitude and angular-speed thresholds with cooldown
//! - **Classification:** rule cascade over pose, trajectory and turn features
//!
//! This crate is pure computation without I/O. Evidence capture and export
//! live in `surftrack-recorder`.

pub mod classifier;
pub mod config;
pub mod consistency;
pub mod detector;
pub mod engine;
pub mod features;
pub mod history;
pub mod pose;
pub mod signal;
pub mod store;
pub mod track;

pub use classifier::ManeuverClassifier;
pub use config::{ClassifierThresholds, ManeuverConfig};
pub use engine::{FrameContext, FrameOutcome, ManeuverEngine, TrackUpdate};
pub use store::{FinalizedTrack, TrackStore};
pub use track::TrackState;
