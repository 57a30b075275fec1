//! Per-frame signal extraction for one track.
//!
//! Every sighting appends to the trajectory, timestamp and pose histories.
//! The motion angle is derived from the last two centroids and smoothed in
//! place with a trailing mean. Activity accounting decides when a track has
//! travelled far enough to be considered surfing rather than standing around.

use surftrack_model::detection::PoseLandmarks;
use surftrack_model::geometry::{BoundingBox, Point2D};

use crate::config::ManeuverConfig;
use crate::detector::wrap_angle;
use crate::pose::extract_pose_features;
use crate::track::TrackState;

/// One sighting of a track, as seen by the extractor.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub frame: u64,
    pub timestamp_secs: f64,
    /// Center of the unclipped detection box.
    pub centroid: Point2D,
    /// Detection box clipped to the frame; landmarks are relative to it.
    pub roi: BoundingBox,
    pub landmarks: Option<&'a PoseLandmarks>,
}

/// What a single update did to the track's activity accounting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalUpdate {
    /// Distance from the previous centroid, if there was one.
    pub displacement: Option<f64>,
    /// The displacement exceeded the jump limit and activity was reset.
    pub activity_reset: bool,
    /// The track became active on this frame.
    pub became_active: bool,
}

/// Stateless extractor; all state lives in [`TrackState`].
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    smoothing_window: usize,
    movement_threshold_px: f64,
    min_travel_distance_px: f64,
    min_active_frames: u32,
    max_jump_px: f64,
    visibility_threshold: f64,
}

impl SignalExtractor {
    pub fn new(config: &ManeuverConfig) -> Self {
        Self {
            smoothing_window: config.angle_smoothing_window.max(1),
            movement_threshold_px: config.movement_threshold_px,
            min_travel_distance_px: config.min_travel_distance_px,
            min_active_frames: config.min_active_frames,
            max_jump_px: config.max_jump_px,
            visibility_threshold: config.pose_visibility_threshold,
        }
    }

    pub fn update(&self, track: &mut TrackState, obs: &Observation<'_>) -> SignalUpdate {
        let centroid = obs.centroid;
        let previous = track.trajectory.last().copied();

        track.trajectory.push(centroid);
        track.timestamps.push(obs.timestamp_secs);
        track.observe_y(centroid.y);
        track.last_frame = obs.frame;

        let mut update = SignalUpdate::default();

        if let Some(prev) = previous {
            let angle = (centroid.y - prev.y).atan2(centroid.x - prev.x);
            self.push_smoothed(track, angle);

            let distance = centroid.distance_to(&prev);
            update.displacement = Some(distance);

            if distance > self.max_jump_px {
                tracing::warn!(
                    track_id = track.id,
                    frame = obs.frame,
                    distance,
                    max_jump = self.max_jump_px,
                    "Implausible jump, resetting activity"
                );
                track.reset_activity();
                update.activity_reset = true;
            } else {
                track.total_distance += distance;
                if distance > self.movement_threshold_px {
                    track.active_frame_count += 1;
                }
                if !track.is_active
                    && track.total_distance >= self.min_travel_distance_px
                    && track.active_frame_count >= self.min_active_frames
                {
                    track.is_active = true;
                    update.became_active = true;
                    tracing::debug!(
                        track_id = track.id,
                        frame = obs.frame,
                        total_distance = track.total_distance,
                        active_frames = track.active_frame_count,
                        "Track became active"
                    );
                }
            }
        }

        let pose = obs.landmarks.and_then(|landmarks| {
            extract_pose_features(
                landmarks,
                obs.roi.width(),
                obs.roi.height(),
                self.visibility_threshold,
            )
        });
        if obs.landmarks.is_some() && pose.is_none() {
            tracing::trace!(track_id = track.id, frame = obs.frame, "Pose unusable");
        }
        track.pose_history.push(pose);

        update
    }

    /// Append a raw angle, then replace it with the trailing mean once the
    /// window is full.
    ///
    /// The window is averaged as offsets from the newest sample, so headings
    /// on both sides of ±π average to a heading near ±π, not near zero.
    fn push_smoothed(&self, track: &mut TrackState, angle: f64) {
        track.angles.push(angle);
        let window = self.smoothing_window;
        if window > 1 && track.angles.len() >= window {
            let offset = track
                .angles
                .tail(window)
                .map(|a| wrap_angle(a - angle))
                .sum::<f64>()
                / window as f64;
            track.angles.replace_last(wrap_angle(angle + offset));
        }
    }
}
