//! Clock and timing utilities for frame timestamps.
//!
//! Every processed frame carries a timestamp in seconds since the session
//! started. Timestamps either follow the video position (`frame / fps`),
//! which keeps reruns deterministic, or a monotonic wall clock anchored at
//! session start.

use std::time::Instant;

use crate::config::TimeSourceKind;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment processing started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant processing started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Converts frame indices to video time.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a frame clock. Non-positive or non-finite rates fall back to `fallback_fps`.
    pub fn new(fps: f64, fallback_fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            fallback_fps
        };
        Self { fps }
    }

    /// Video time of a frame in seconds.
    pub fn frame_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Source of per-frame timestamps.
#[derive(Debug, Clone)]
pub enum TimeSource {
    Video(FrameClock),
    WallClock(SessionClock),
}

impl TimeSource {
    /// Build a time source of the configured kind.
    pub fn from_kind(kind: TimeSourceKind, fps: f64, fallback_fps: f64) -> Self {
        match kind {
            TimeSourceKind::Video => Self::Video(FrameClock::new(fps, fallback_fps)),
            TimeSourceKind::WallClock => Self::WallClock(SessionClock::start()),
        }
    }

    /// Timestamp for the given frame, in seconds since session start.
    pub fn timestamp_secs(&self, frame: u64) -> f64 {
        match self {
            Self::Video(clock) => clock.frame_secs(frame),
            Self::WallClock(clock) => clock.elapsed_secs(),
        }
    }
}
