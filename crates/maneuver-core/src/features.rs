//! Feature snapshots taken at the moment a turn is accepted.

use surftrack_model::geometry::Point2D;
use surftrack_model::maneuver::{PoseFeatures, TrajectoryFeatures};

use crate::config::ManeuverConfig;
use crate::detector::wrap_angle;
use crate::history::History;
use crate::track::TrackState;

/// Triangle areas at or below this (px²) are treated as colinear.
const COLINEAR_AREA_EPSILON: f64 = 1e-6;

/// Radius of the circle through three points, `abc / (4·area)`.
///
/// Returns `f64::INFINITY` for colinear or coincident points.
pub fn circumradius(a: &Point2D, b: &Point2D, c: &Point2D) -> f64 {
    let area = ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5;
    if !(area > COLINEAR_AREA_EPSILON) {
        return f64::INFINITY;
    }
    let ab = a.distance_to(b);
    let bc = b.distance_to(c);
    let ca = c.distance_to(a);
    (ab * bc * ca) / (4.0 * area)
}

/// Most recent pose snapshot that was actually extracted.
pub fn latest_pose(history: &History<Option<PoseFeatures>>) -> Option<PoseFeatures> {
    history.iter().rev().find_map(|slot| *slot)
}

#[derive(Debug, Clone)]
pub struct FeatureAggregator {
    window: usize,
    time_epsilon_s: f64,
}

impl FeatureAggregator {
    pub fn new(config: &ManeuverConfig) -> Self {
        Self {
            window: config.feature_window.max(3),
            time_epsilon_s: config.time_epsilon_s,
        }
    }

    /// Pose and trajectory snapshots for a track that just turned.
    pub fn aggregate(&self, track: &TrackState) -> (Option<PoseFeatures>, Option<TrajectoryFeatures>) {
        (
            latest_pose(track.pose_history()),
            self.trajectory_features(track.trajectory(), track.timestamps(), track.angles()),
        )
    }

    /// Trajectory features over the most recent window, or `None` with
    /// fewer than three points.
    pub fn trajectory_features(
        &self,
        trajectory: &History<Point2D>,
        timestamps: &History<f64>,
        angles: &History<f64>,
    ) -> Option<TrajectoryFeatures> {
        let points = trajectory.recent(self.window);
        if points.len() < 3 {
            return None;
        }
        let first = points[0];
        let middle = points[points.len() / 2];
        let last = points[points.len() - 1];

        let turn_radius = circumradius(&first, &middle, &last);

        let path_length: f64 = points.windows(2).map(|p| p[0].distance_to(&p[1])).sum();
        let times = timestamps.recent(points.len());
        let elapsed = match (times.first(), times.last()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        };
        let avg_speed = if elapsed > self.time_epsilon_s {
            path_length / elapsed
        } else {
            0.0
        };

        let vertical_displacement = last.y - first.y;

        let headings = angles.recent(points.len() - 1);
        let path_smoothness = std_dev(
            &headings
                .windows(2)
                .map(|h| wrap_angle(h[1] - h[0]).to_degrees())
                .collect::<Vec<_>>(),
        );

        Some(TrajectoryFeatures {
            turn_radius,
            avg_speed,
            vertical_displacement,
            path_smoothness,
        })
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history<T>(items: impl IntoIterator<Item = T>) -> History<T> {
        let mut h = History::new(70);
        for item in items {
            h.push(item);
        }
        h
    }

    #[test]
    fn test_colinear_radius_is_infinite() {
        let r = circumradius(
            &Point2D::new(0.0, 0.0),
            &Point2D::new(5.0, 5.0),
            &Point2D::new(10.0, 10.0),
        );
        assert!(r.is_infinite());

        let p = Point2D::new(3.0, 4.0);
        assert!(circumradius(&p, &p, &p).is_infinite());
    }

    #[test]
    fn test_radius_of_circle_points() {
        // Three points on a circle of radius 50 around the origin.
        let r = circumradius(
            &Point2D::new(50.0, 0.0),
            &Point2D::new(0.0, 50.0),
            &Point2D::new(-50.0, 0.0),
        );
        assert!((r - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_pose_skips_gaps() {
        let pose = PoseFeatures {
            body_lean: 12.0,
            knee_bend: Some(150.0),
            arm_extension: None,
            center_mass_y: 0.5,
            shoulder_rotation: 3.0,
            hip_shoulder_alignment: 4.0,
        };
        let h = history([None, Some(pose), None, None]);
        assert_eq!(latest_pose(&h), Some(pose));
        let empty: History<Option<PoseFeatures>> = history([None, None]);
        assert_eq!(latest_pose(&empty), None);
    }

    #[test]
    fn test_straight_line_features() {
        let aggregator = FeatureAggregator::new(&ManeuverConfig::default());
        let points = history((0..20).map(|i| Point2D::new(i as f64 * 10.0, 100.0 + i as f64 * 2.0)));
        let times = history((0..20).map(|i| i as f64 / 10.0));
        let heading = 2.0f64.atan2(10.0);
        let angles = history((1..20).map(|_| heading));

        let f = aggregator.trajectory_features(&points, &times, &angles).unwrap();
        assert!(f.turn_radius.is_infinite());
        assert!(!f.has_finite_radius());
        // 14 steps of sqrt(104) px over 1.4 s.
        assert!((f.avg_speed - 104f64.sqrt() * 10.0).abs() < 1e-6);
        assert!((f.vertical_displacement - 28.0).abs() < 1e-9);
        assert!(f.path_smoothness.abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let aggregator = FeatureAggregator::new(&ManeuverConfig::default());
        let points = history([Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        let times = history([0.0, 0.1]);
        let angles = history([0.0]);
        assert!(aggregator.trajectory_features(&points, &times, &angles).is_none());
    }

    #[test]
    fn test_frozen_clock_gives_zero_speed() {
        let aggregator = FeatureAggregator::new(&ManeuverConfig::default());
        let points = history((0..5).map(|i| Point2D::new(i as f64, 0.0)));
        let times = history((0..5).map(|_| 2.0));
        let angles = history((0..4).map(|_| 0.0));
        let f = aggregator.trajectory_features(&points, &times, &angles).unwrap();
        assert_eq!(f.avg_speed, 0.0);
    }
}
