//! Rule cascade mapping turn, pose and trajectory features to a label.
//!
//! Rules are evaluated in a fixed order and the first match wins. The
//! cascade only runs with a complete feature set; anything missing falls
//! back to a plain [`ManeuverType::Turn`].

use surftrack_model::maneuver::{ManeuverType, PoseFeatures, TrajectoryFeatures, TurnMetrics};

use crate::config::ClassifierThresholds;

#[derive(Debug, Clone, Default)]
pub struct ManeuverClassifier {
    thresholds: ClassifierThresholds,
}

impl ManeuverClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(
        &self,
        turn: &TurnMetrics,
        pose: Option<&PoseFeatures>,
        trajectory: Option<&TrajectoryFeatures>,
    ) -> ManeuverType {
        let (Some(pose), Some(trajectory)) = (pose, trajectory) else {
            return ManeuverType::Turn;
        };
        let (Some(knee_bend), Some(arm_extension)) = (pose.knee_bend, pose.arm_extension) else {
            return ManeuverType::Turn;
        };

        let t = &self.thresholds;
        let lean = pose.body_lean;
        let radius = trajectory.turn_radius;
        let drop = trajectory.vertical_displacement;
        let moderate_lean = (t.moderate_lean_min_deg..=t.moderate_lean_max_deg).contains(&lean);
        let arms_extended = arm_extension >= t.extended_arm_min;

        if turn.angular_speed_deg_s >= t.snap_min_angular_speed_deg_s
            && radius < t.snap_max_radius_px
            && knee_bend < t.snap_max_knee_bend_deg
            && lean >= t.snap_min_lean_deg
        {
            return ManeuverType::Snap;
        }

        if radius >= t.large_radius_px
            && lean >= t.bottom_turn_min_lean_deg
            && drop >= t.bottom_turn_min_drop_px
            && trajectory.avg_speed >= t.bottom_turn_min_speed_px_s
        {
            return ManeuverType::BottomTurn;
        }

        if radius >= t.large_radius_px
            && moderate_lean
            && arms_extended
            && turn.angle_deg >= t.cutback_min_angle_deg
        {
            return ManeuverType::Cutback;
        }

        if (pose.center_mass_y <= t.floater_max_center_mass_y || drop <= -t.floater_min_rise_px)
            && arms_extended
        {
            return ManeuverType::Floater;
        }

        if moderate_lean && (t.carve_min_angle_deg..=t.carve_max_angle_deg).contains(&turn.angle_deg) {
            return ManeuverType::Carve;
        }

        ManeuverType::Turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surftrack_model::maneuver::TurnDirection;

    fn turn(angle_deg: f64, angular_speed_deg_s: f64) -> TurnMetrics {
        TurnMetrics {
            angle_deg,
            direction: TurnDirection::Left,
            angular_speed_deg_s,
        }
    }

    fn pose(body_lean: f64, knee_bend: f64, arm_extension: f64, center_mass_y: f64) -> PoseFeatures {
        PoseFeatures {
            body_lean,
            knee_bend: Some(knee_bend),
            arm_extension: Some(arm_extension),
            center_mass_y,
            shoulder_rotation: 0.0,
            hip_shoulder_alignment: 5.0,
        }
    }

    fn trajectory(turn_radius: f64, avg_speed: f64, vertical_displacement: f64) -> TrajectoryFeatures {
        TrajectoryFeatures {
            turn_radius,
            avg_speed,
            vertical_displacement,
            path_smoothness: 2.0,
        }
    }

    fn classify(t: TurnMetrics, p: PoseFeatures, tr: TrajectoryFeatures) -> ManeuverType {
        ManeuverClassifier::default().classify(&t, Some(&p), Some(&tr))
    }

    #[test]
    fn test_snap() {
        let label = classify(turn(60.0, 220.0), pose(35.0, 110.0, 0.5, 0.5), trajectory(40.0, 200.0, 0.0));
        assert_eq!(label, ManeuverType::Snap);
    }

    #[test]
    fn test_bottom_turn() {
        let label = classify(turn(30.0, 90.0), pose(40.0, 150.0, 0.5, 0.6), trajectory(300.0, 180.0, 45.0));
        assert_eq!(label, ManeuverType::BottomTurn);
    }

    #[test]
    fn test_cutback() {
        let label = classify(turn(70.0, 90.0), pose(20.0, 150.0, 0.9, 0.6), trajectory(f64::INFINITY, 80.0, 0.0));
        assert_eq!(label, ManeuverType::Cutback);
    }

    #[test]
    fn test_floater() {
        let label = classify(turn(25.0, 90.0), pose(5.0, 160.0, 0.85, 0.3), trajectory(100.0, 80.0, 0.0));
        assert_eq!(label, ManeuverType::Floater);

        // Rising path also qualifies.
        let label = classify(turn(25.0, 90.0), pose(5.0, 160.0, 0.85, 0.6), trajectory(100.0, 80.0, -30.0));
        assert_eq!(label, ManeuverType::Floater);
    }

    #[test]
    fn test_carve() {
        let label = classify(turn(25.0, 90.0), pose(20.0, 160.0, 0.5, 0.6), trajectory(100.0, 80.0, 0.0));
        assert_eq!(label, ManeuverType::Carve);
    }

    #[test]
    fn test_fallback_turn() {
        let label = classify(turn(80.0, 90.0), pose(50.0, 160.0, 0.5, 0.6), trajectory(100.0, 80.0, 0.0));
        assert_eq!(label, ManeuverType::Turn);
    }

    #[test]
    fn test_snap_wins_over_later_rules() {
        // Also satisfies the floater rule; the earlier snap rule must win.
        let label = classify(turn(60.0, 220.0), pose(35.0, 110.0, 0.9, 0.2), trajectory(40.0, 200.0, -40.0));
        assert_eq!(label, ManeuverType::Snap);
    }

    #[test]
    fn test_missing_inputs_yield_turn() {
        let classifier = ManeuverClassifier::default();
        let t = turn(60.0, 220.0);
        let p = pose(35.0, 110.0, 0.5, 0.5);
        let tr = trajectory(40.0, 200.0, 0.0);

        assert_eq!(classifier.classify(&t, None, Some(&tr)), ManeuverType::Turn);
        assert_eq!(classifier.classify(&t, Some(&p), None), ManeuverType::Turn);

        let no_knees = PoseFeatures { knee_bend: None, ..p };
        assert_eq!(classifier.classify(&t, Some(&no_knees), Some(&tr)), ManeuverType::Turn);
        let no_arms = PoseFeatures { arm_extension: None, ..p };
        assert_eq!(classifier.classify(&t, Some(&no_arms), Some(&tr)), ManeuverType::Turn);
    }
}
