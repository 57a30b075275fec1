//! Detection and pose-landmark types for the per-frame input stream.
//!
//! Detection logs are stored as append-only JSONL: an optional `#`-prefixed
//! header line carrying [`VideoInfo`], followed by one frame object per line.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Identifier assigned by the external tracker.
pub type TrackId = u64;

/// COCO class id of "person".
pub const PERSON_CLASS_ID: u32 = 0;

/// Number of landmarks in the MediaPipe pose topology.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Named landmark positions in the 33-point pose topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIndex {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

/// Skeleton edges drawn by overlay renderers, as landmark index pairs.
pub const POSE_CONNECTIONS: &[(usize, usize)] = &[
    (11, 12),
    (11, 13),
    (13, 15),
    (12, 14),
    (14, 16),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (25, 27),
    (24, 26),
    (26, 28),
];

/// A single body landmark, normalized to the detection box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }
}

/// Landmarks for one person, ordered by the pose topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PoseLandmarks(pub Vec<Landmark>);

impl PoseLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self(landmarks)
    }

    /// Landmark at a named position, if the list is long enough.
    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.0.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.0.iter()
    }
}

/// Video metadata written as the detection log header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    /// Rotation already applied by the decoder (degrees).
    #[serde(default)]
    pub rotation: i32,
}

/// One detector/tracker output entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,

    #[serde(default)]
    pub class_id: u32,

    /// `None` when the tracker has not assigned an identity yet.
    #[serde(default)]
    pub track_id: Option<TrackId>,

    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Landmarks from the pose collaborator, scoped to `bbox`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_landmarks: Option<PoseLandmarks>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Detection {
    /// A tracked person detection without landmarks.
    pub fn person(track_id: TrackId, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            class_id: PERSON_CLASS_ID,
            track_id: Some(track_id),
            confidence: 1.0,
            pose_landmarks: None,
        }
    }

    pub fn with_pose(mut self, landmarks: PoseLandmarks) -> Self {
        self.pose_landmarks = Some(landmarks);
        self
    }
}

/// All detections of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    pub frame: u64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A detection as recorded in the tracking log, with the track's running
/// maneuver count at that frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDetection {
    pub track_id: TrackId,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub maneuver_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_landmarks: Option<PoseLandmarks>,
}

/// One line of the tracking log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFrame {
    pub frame: u64,
    pub detections: Vec<TrackedDetection>,
}

/// Parse the `#`-prefixed header line, if present.
pub fn parse_header(jsonl: &str) -> Result<Option<VideoInfo>, serde_json::Error> {
    match jsonl
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
    {
        Some(line) => serde_json::from_str(line.trim_start_matches('#').trim()).map(Some),
        None => Ok(None),
    }
}

/// Parse JSONL records (one JSON object per line), skipping blanks and
/// `#` header lines.
pub fn parse_lines<T>(jsonl: &str) -> Result<Vec<T>, serde_json::Error>
where
    T: serde::de::DeserializeOwned,
{
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Parse a detection log.
pub fn parse_frames(jsonl: &str) -> Result<Vec<FrameDetections>, serde_json::Error> {
    parse_lines(jsonl)
}

/// Parse a tracking log.
pub fn parse_tracked_frames(jsonl: &str) -> Result<Vec<TrackedFrame>, serde_json::Error> {
    parse_lines(jsonl)
}
