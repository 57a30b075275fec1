//! Thresholds and window sizes for the maneuver engine.
//!
//! Every numeric threshold is tunable; none of the defaults is a hard
//! invariant. Pixel thresholds are in frame space, so footage with a very
//! different resolution usually needs its own values.

use serde::{Deserialize, Serialize};
use surftrack_common::error::{SurftrackError, SurftrackResult};

/// Immutable engine configuration, passed in at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManeuverConfig {
    /// Capacity of every per-track history ring.
    pub history_capacity: usize,

    /// Trailing window used to smooth the most recent heading sample.
    pub angle_smoothing_window: usize,

    /// Detector class treated as a person.
    pub person_class_id: u32,

    /// Detections below this confidence are ignored.
    pub min_confidence: f64,

    /// A frame counts as "active" when the centroid moves more than this (pixels).
    pub movement_threshold_px: f64,

    /// Total travel required before a track can become active (pixels).
    pub min_travel_distance_px: f64,

    /// Active frames required before a track can become active.
    pub min_active_frames: u32,

    /// Largest plausible single-frame displacement (pixels). Anything above
    /// is treated as a tracker identity swap.
    pub max_jump_px: f64,

    /// Number of recent positions inspected by the consistency guard.
    pub consistency_window: usize,

    /// Minimum frame gap between two accepted maneuvers of one track.
    pub min_frames_between_maneuvers: u64,

    /// Number of heading differences that must agree in sign.
    pub sustain_window: usize,

    /// Number of recent heading samples the detector looks at.
    pub detector_lookback: usize,

    /// Minimum heading change over the sustain window (degrees).
    pub min_turn_angle_deg: f64,

    /// Minimum mean angular speed over the sustain window (degrees/second).
    pub min_angular_speed_deg_s: f64,

    /// Substitute for non-positive time deltas (seconds).
    pub time_epsilon_s: f64,

    /// Number of recent trajectory points used for trajectory features.
    pub feature_window: usize,

    /// Landmarks at or below this visibility are ignored for joint angles.
    pub pose_visibility_threshold: f64,

    /// Rule thresholds for the maneuver classifier.
    pub classifier: ClassifierThresholds,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            history_capacity: 70,
            angle_smoothing_window: 5,
            person_class_id: 0,
            min_confidence: 0.4,
            movement_threshold_px: 2.0,
            min_travel_distance_px: 100.0,
            min_active_frames: 10,
            max_jump_px: 150.0,
            consistency_window: 5,
            min_frames_between_maneuvers: 20,
            sustain_window: 5,
            detector_lookback: 12,
            min_turn_angle_deg: 15.0,
            min_angular_speed_deg_s: 60.0,
            time_epsilon_s: 1e-3,
            feature_window: 15,
            pose_visibility_threshold: 0.5,
            classifier: ClassifierThresholds::default(),
        }
    }
}

/// Thresholds of the classification rule cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub snap_min_angular_speed_deg_s: f64,
    pub snap_max_radius_px: f64,
    pub snap_max_knee_bend_deg: f64,
    pub snap_min_lean_deg: f64,

    /// Radius above which a turn counts as drawn-out (bottom turn, cutback).
    pub large_radius_px: f64,

    pub bottom_turn_min_lean_deg: f64,
    /// Minimum downward travel over the feature window (pixels).
    pub bottom_turn_min_drop_px: f64,
    pub bottom_turn_min_speed_px_s: f64,

    /// Inclusive lean band considered "moderate" (degrees).
    pub moderate_lean_min_deg: f64,
    pub moderate_lean_max_deg: f64,

    /// Arm extension at or above which arms count as extended.
    pub extended_arm_min: f64,

    pub cutback_min_angle_deg: f64,

    /// Center of mass at or above this normalized height counts as elevated.
    pub floater_max_center_mass_y: f64,
    /// Minimum upward travel over the feature window (pixels).
    pub floater_min_rise_px: f64,

    /// Inclusive turn-angle band considered "moderate" (degrees).
    pub carve_min_angle_deg: f64,
    pub carve_max_angle_deg: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            snap_min_angular_speed_deg_s: 150.0,
            snap_max_radius_px: 80.0,
            snap_max_knee_bend_deg: 140.0,
            snap_min_lean_deg: 20.0,
            large_radius_px: 150.0,
            bottom_turn_min_lean_deg: 30.0,
            bottom_turn_min_drop_px: 20.0,
            bottom_turn_min_speed_px_s: 100.0,
            moderate_lean_min_deg: 10.0,
            moderate_lean_max_deg: 30.0,
            extended_arm_min: 0.75,
            cutback_min_angle_deg: 40.0,
            floater_max_center_mass_y: 0.35,
            floater_min_rise_px: 15.0,
            carve_min_angle_deg: 15.0,
            carve_max_angle_deg: 40.0,
        }
    }
}

impl ManeuverConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SurftrackResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> SurftrackResult<()> {
        if self.history_capacity < 3 {
            return Err(SurftrackError::config("history_capacity must be at least 3"));
        }
        if self.angle_smoothing_window == 0 {
            return Err(SurftrackError::config(
                "angle_smoothing_window must be at least 1",
            ));
        }
        if self.sustain_window < 2 {
            return Err(SurftrackError::config("sustain_window must be at least 2"));
        }
        if self.detector_lookback < self.sustain_window + 1 {
            return Err(SurftrackError::config(
                "detector_lookback must exceed sustain_window",
            ));
        }
        if self.sustain_window + 2 > self.history_capacity {
            return Err(SurftrackError::config(
                "history_capacity too small for sustain_window",
            ));
        }
        if self.consistency_window < 2 {
            return Err(SurftrackError::config(
                "consistency_window must be at least 2",
            ));
        }
        if self.feature_window < 3 {
            return Err(SurftrackError::config("feature_window must be at least 3"));
        }
        if !(self.max_jump_px > 0.0) {
            return Err(SurftrackError::config("max_jump_px must be positive"));
        }
        if !(self.time_epsilon_s > 0.0) {
            return Err(SurftrackError::config("time_epsilon_s must be positive"));
        }
        let c = &self.classifier;
        if c.moderate_lean_min_deg > c.moderate_lean_max_deg
            || c.carve_min_angle_deg > c.carve_max_angle_deg
        {
            return Err(SurftrackError::config(
                "classifier bands must have min <= max",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ManeuverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            ManeuverConfig::from_json(r#"{"max_jump_px": 90.0, "classifier": {"snap_max_radius_px": 60}}"#)
                .unwrap();
        assert!((config.max_jump_px - 90.0).abs() < 1e-9);
        assert_eq!(config.history_capacity, 70);
        assert!((config.classifier.snap_max_radius_px - 60.0).abs() < 1e-9);
        assert!((config.classifier.large_radius_px - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_inconsistent_windows() {
        let config = ManeuverConfig {
            sustain_window: 8,
            detector_lookback: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ManeuverConfig {
            history_capacity: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(ManeuverConfig::from_json(r#"{"max_jump_px": 0}"#).is_err());
    }
}
