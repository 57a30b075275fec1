//! Geometric body features from normalized pose landmarks.
//!
//! Landmarks arrive normalized to the detection box. Angles are measured
//! after scaling back to ROI pixels so that non-square boxes do not skew
//! them; `center_mass_y` stays normalized.

use surftrack_model::detection::{Landmark, LandmarkIndex, PoseLandmarks};
use surftrack_model::geometry::Point2D;
use surftrack_model::maneuver::PoseFeatures;

/// Extract pose features, or `None` when the landmarks are unusable.
///
/// `None` means "no usable pose this frame"; callers must never substitute
/// a zeroed record for it.
pub fn extract_pose_features(
    landmarks: &PoseLandmarks,
    roi_width: f64,
    roi_height: f64,
    visibility_threshold: f64,
) -> Option<PoseFeatures> {
    if !(roi_width > 0.0 && roi_height > 0.0) {
        return None;
    }
    let scale = |lm: &Landmark| Point2D::new(lm.x * roi_width, lm.y * roi_height);

    let (l_shoulder, l_shoulder_lm) = anchor(landmarks, LandmarkIndex::LeftShoulder, &scale)?;
    let (r_shoulder, r_shoulder_lm) = anchor(landmarks, LandmarkIndex::RightShoulder, &scale)?;
    let (l_hip, l_hip_lm) = anchor(landmarks, LandmarkIndex::LeftHip, &scale)?;
    let (r_hip, r_hip_lm) = anchor(landmarks, LandmarkIndex::RightHip, &scale)?;

    let shoulder_center = Point2D::midpoint(&l_shoulder, &r_shoulder);
    let hip_center = Point2D::midpoint(&l_hip, &r_hip);

    // Torso vector against image-down vertical.
    let torso = (hip_center.x - shoulder_center.x, hip_center.y - shoulder_center.y);
    let torso_len = (torso.0 * torso.0 + torso.1 * torso.1).sqrt();
    if !(torso_len > 0.0) {
        return None;
    }
    let cos_lean = (torso.1 / torso_len).clamp(-1.0, 1.0);
    let body_lean = cos_lean.acos().to_degrees();

    let visible = |lm: &Landmark| lm.visibility > visibility_threshold;

    let knee_bend = mean(
        [
            (l_hip_lm, LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
            (r_hip_lm, LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
        ]
        .into_iter()
        .filter_map(|(hip_lm, knee, ankle)| {
            let knee = landmarks.get(knee)?;
            let ankle = landmarks.get(ankle)?;
            (visible(hip_lm) && visible(knee) && visible(ankle))
                .then(|| joint_angle(&scale(hip_lm), &scale(knee), &scale(ankle)))
        }),
    );

    let arm_extension = mean(
        [
            (l_shoulder_lm, LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
            (r_shoulder_lm, LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
        ]
        .into_iter()
        .filter_map(|(shoulder_lm, elbow, wrist)| {
            let elbow = landmarks.get(elbow)?;
            let wrist = landmarks.get(wrist)?;
            (visible(shoulder_lm) && visible(elbow) && visible(wrist))
                .then(|| joint_angle(&scale(shoulder_lm), &scale(elbow), &scale(wrist)))
        }),
    )
    .map(|angle| angle / 180.0);

    let center_mass_y = (shoulder_center.y + hip_center.y) * 0.5 / roi_height;

    let shoulder_angle = line_angle(&l_shoulder, &r_shoulder);
    let hip_angle = line_angle(&l_hip, &r_hip);
    let shoulder_rotation = shoulder_angle;
    let hip_shoulder_alignment = angle_between_lines(shoulder_angle, hip_angle);

    let features = PoseFeatures {
        body_lean,
        knee_bend,
        arm_extension,
        center_mass_y,
        shoulder_rotation,
        hip_shoulder_alignment,
    };

    all_finite(&features).then_some(features)
}

/// A torso landmark in ROI pixels. Torso landmarks are required regardless
/// of visibility, but must be finite.
fn anchor<'a>(
    landmarks: &'a PoseLandmarks,
    index: LandmarkIndex,
    scale: &impl Fn(&Landmark) -> Point2D,
) -> Option<(Point2D, &'a Landmark)> {
    let lm = landmarks.get(index)?;
    let p = scale(lm);
    p.is_finite().then_some((p, lm))
}

/// Angle at `b` formed by `a-b-c`, in degrees. 180° when either arm of the
/// joint has zero length.
pub fn joint_angle(a: &Point2D, b: &Point2D, c: &Point2D) -> f64 {
    let ba = (a.x - b.x, a.y - b.y);
    let bc = (c.x - b.x, c.y - b.y);
    let len_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let len_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    if len_ba == 0.0 || len_bc == 0.0 {
        return 180.0;
    }
    let cos = ((ba.0 * bc.0 + ba.1 * bc.1) / (len_ba * len_bc)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Angle of the line from `a` to `b` against horizontal, in degrees.
fn line_angle(a: &Point2D, b: &Point2D) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Absolute difference of two line angles, folded into `[0, 180]`.
fn angle_between_lines(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn all_finite(f: &PoseFeatures) -> bool {
    [
        f.body_lean,
        f.center_mass_y,
        f.shoulder_rotation,
        f.hip_shoulder_alignment,
    ]
    .iter()
    .chain(f.knee_bend.iter())
    .chain(f.arm_extension.iter())
    .all(|v| v.is_finite())
}
