//! Maneuver events and the feature snapshots attached to them.

use serde::{Deserialize, Serialize};

use crate::detection::TrackId;

/// Classified surfing maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverType {
    Snap,
    BottomTurn,
    Cutback,
    Floater,
    Carve,
    /// Generic label used whenever the evidence does not support a specific one.
    Turn,
}

impl ManeuverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snap => "snap",
            Self::BottomTurn => "bottom_turn",
            Self::Cutback => "cutback",
            Self::Floater => "floater",
            Self::Carve => "carve",
            Self::Turn => "turn",
        }
    }
}

impl std::fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn direction as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Direction from a signed heading change in image coordinates (y down):
    /// a decreasing heading is a counter-clockwise, i.e. left, turn.
    pub fn from_angle_change(delta: f64) -> Self {
        if delta < 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Raw metrics of the turn that triggered detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnMetrics {
    /// Absolute heading change over the sustain window (degrees).
    #[serde(rename = "angle")]
    pub angle_deg: f64,
    pub direction: TurnDirection,
    /// Mean angular speed over the sustain window (degrees per second).
    #[serde(rename = "angular_speed")]
    pub angular_speed_deg_s: f64,
}

/// Geometric body features derived from one frame's landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseFeatures {
    /// Torso angle from vertical (degrees).
    pub body_lean: f64,
    /// Mean hip–knee–ankle angle (degrees); absent when no leg is visible.
    pub knee_bend: Option<f64>,
    /// Mean shoulder–elbow–wrist angle scaled to `[0, 1]`; absent when no arm is visible.
    pub arm_extension: Option<f64>,
    /// Normalized vertical midpoint of shoulders and hips.
    pub center_mass_y: f64,
    /// Shoulder line angle from horizontal (degrees).
    pub shoulder_rotation: f64,
    /// Twist between shoulder and hip lines (degrees).
    pub hip_shoulder_alignment: f64,
}

/// Trajectory features computed when a maneuver fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFeatures {
    /// Circumradius through the window's first, middle and last points (pixels).
    /// `f64::INFINITY` for straight paths; serialized as `null`.
    #[serde(with = "radius_serde")]
    pub turn_radius: f64,
    /// Path length over elapsed time (pixels per second).
    pub avg_speed: f64,
    /// Last minus first y over the window (pixels, positive = downward).
    pub vertical_displacement: f64,
    /// Standard deviation of consecutive heading changes (degrees).
    pub path_smoothness: f64,
}

impl TrajectoryFeatures {
    pub fn has_finite_radius(&self) -> bool {
        self.turn_radius.is_finite()
    }
}

/// Serializes non-finite radii as `null` and reads `null` back as infinity.
mod radius_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// A single accepted, classified maneuver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverEvent {
    pub frame: u64,
    /// Elapsed session time (seconds).
    pub timestamp: f64,
    pub maneuver_type: ManeuverType,
    pub metrics: TurnMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_features: Option<PoseFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_features: Option<TrajectoryFeatures>,
}

/// Exported record for one track (`maneuvers.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,
    pub total_maneuvers: u32,
    pub events: Vec<ManeuverEvent>,
}
