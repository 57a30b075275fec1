use proptest::prelude::*;

use surftrack_core::{FinalizedTrack, FrameContext, FrameOutcome, ManeuverClassifier, ManeuverConfig, ManeuverEngine};
use surftrack_model::detection::{Detection, Landmark, LandmarkIndex, PoseLandmarks, TrackId, POSE_LANDMARK_COUNT};
use surftrack_model::geometry::BoundingBox;
use surftrack_model::maneuver::{ManeuverType, TurnDirection};

const FPS: f64 = 30.0;

/// Drives one synthetic surfer through the engine, one frame per step.
struct Surfer {
    id: TrackId,
    x: f64,
    y: f64,
    frame: u64,
    pose: Option<PoseLandmarks>,
}

impl Surfer {
    fn new(id: TrackId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            frame: 0,
            pose: None,
        }
    }

    fn detection(&self) -> Detection {
        let det = Detection::person(self.id, BoundingBox::centered(self.x, self.y, 60.0, 120.0));
        match &self.pose {
            Some(pose) => det.with_pose(pose.clone()),
            None => det,
        }
    }

    fn ctx(&self) -> FrameContext {
        FrameContext {
            frame: self.frame,
            timestamp_secs: self.frame as f64 / FPS,
            width: 1920,
            height: 1080,
        }
    }

    /// Process the current position, then advance the frame counter.
    fn emit(&mut self, engine: &mut ManeuverEngine) -> FrameOutcome {
        let updates = engine.process_frame(&[self.detection()], &self.ctx());
        self.frame += 1;
        assert_eq!(updates.len(), 1);
        updates.into_iter().next().map(|u| u.outcome).unwrap()
    }

    fn step(&mut self, engine: &mut ManeuverEngine, heading_deg: f64, speed_px: f64) -> FrameOutcome {
        let r = heading_deg.to_radians();
        self.x += speed_px * r.cos();
        self.y += speed_px * r.sin();
        self.emit(engine)
    }
}

fn upright_pose() -> PoseLandmarks {
    let mut points = vec![Landmark::new(0.5, 0.5, 0.0); POSE_LANDMARK_COUNT];
    let layout = [
        (LandmarkIndex::LeftShoulder, 0.4, 0.2),
        (LandmarkIndex::RightShoulder, 0.6, 0.2),
        (LandmarkIndex::LeftElbow, 0.35, 0.35),
        (LandmarkIndex::RightElbow, 0.65, 0.35),
        (LandmarkIndex::LeftWrist, 0.3, 0.45),
        (LandmarkIndex::RightWrist, 0.7, 0.45),
        (LandmarkIndex::LeftHip, 0.42, 0.55),
        (LandmarkIndex::RightHip, 0.58, 0.55),
        (LandmarkIndex::LeftKnee, 0.45, 0.72),
        (LandmarkIndex::RightKnee, 0.55, 0.72),
        (LandmarkIndex::LeftAnkle, 0.42, 0.92),
        (LandmarkIndex::RightAnkle, 0.58, 0.92),
    ];
    for (index, x, y) in layout {
        points[index as usize] = Landmark::new(x, y, 0.95);
    }
    PoseLandmarks::new(points)
}

/// Straight run along +x, then a 60° left rotation in 10° steps, then a
/// straight run on the new heading.
fn run_left_turn(engine: &mut ManeuverEngine, surfer: &mut Surfer) -> Vec<FrameOutcome> {
    let mut outcomes = vec![surfer.emit(engine)];
    for _ in 0..14 {
        outcomes.push(surfer.step(engine, 0.0, 10.0));
    }
    for k in 1..=6 {
        outcomes.push(surfer.step(engine, -10.0 * k as f64, 10.0));
    }
    for _ in 0..40 {
        outcomes.push(surfer.step(engine, -60.0, 10.0));
    }
    outcomes
}

#[test]
fn steady_left_rotation_yields_one_left_turn() {
    let mut engine = ManeuverEngine::new(ManeuverConfig::default());
    let mut surfer = Surfer::new(1, 200.0, 700.0);
    let outcomes = run_left_turn(&mut engine, &mut surfer);

    let events: Vec<_> = outcomes.iter().filter_map(FrameOutcome::maneuver).collect();
    assert_eq!(events.len(), 1, "outcomes: {outcomes:?}");
    let event = events[0];
    // Without a pose snapshot the classifier cannot go past a plain turn.
    assert_eq!(event.maneuver_type, ManeuverType::Turn);
    assert_eq!(event.metrics.direction, TurnDirection::Left);
    assert_eq!(event.frame, 20);
    assert!(event.metrics.angle_deg >= 15.0);
    assert!(event.metrics.angular_speed_deg_s >= 60.0);
    assert!(event.pose_features.is_none());
    assert!(event.trajectory_features.is_some());

    let track = engine.track(1).unwrap();
    assert_eq!(track.maneuver_count(), 1);
    assert_eq!(track.last_maneuver_frame(), Some(20));
}

#[test]
fn pose_snapshot_feeds_classifier() {
    let config = ManeuverConfig::default();
    let mut engine = ManeuverEngine::new(config.clone());
    let mut surfer = Surfer::new(3, 200.0, 700.0);
    surfer.pose = Some(upright_pose());
    let outcomes = run_left_turn(&mut engine, &mut surfer);

    let event = outcomes
        .iter()
        .find_map(FrameOutcome::maneuver)
        .expect("turn should be detected");
    let pose = event.pose_features.expect("pose snapshot should be attached");
    assert!(pose.knee_bend.is_some());
    assert!(pose.arm_extension.is_some());

    let classifier = ManeuverClassifier::new(config.classifier);
    assert_eq!(
        event.maneuver_type,
        classifier.classify(&event.metrics, Some(&pose), event.trajectory_features.as_ref())
    );
}

#[test]
fn small_motion_never_activates() {
    let mut engine = ManeuverEngine::new(ManeuverConfig::default());
    let mut surfer = Surfer::new(2, 500.0, 500.0);
    surfer.emit(&mut engine);
    for _ in 0..49 {
        let outcome = surfer.step(&mut engine, 0.0, 1.0);
        assert_eq!(outcome, FrameOutcome::Inactive);
    }

    let track = engine.track(2).unwrap();
    assert!(!track.is_active());
    assert!(track.events().is_empty());
    assert_eq!(engine.finalize(), vec![FinalizedTrack::Discard(2)]);
}

#[test]
fn identity_swap_resets_activity_and_blocks_detection() {
    let config = ManeuverConfig::default();
    let mut engine = ManeuverEngine::new(config.clone());
    let mut surfer = Surfer::new(4, 200.0, 700.0);
    run_left_turn(&mut engine, &mut surfer);
    for _ in 0..3 {
        surfer.step(&mut engine, -60.0, 10.0);
    }
    assert_eq!(engine.track(4).unwrap().maneuver_count(), 1);
    assert!(engine.track(4).unwrap().is_active());

    surfer.x += 300.0;
    let outcome = surfer.emit(&mut engine);
    assert!(matches!(outcome, FrameOutcome::IdentitySwap { distance } if distance > config.max_jump_px));

    let track = engine.track(4).unwrap();
    assert_eq!(track.total_distance(), 0.0);
    assert_eq!(track.active_frame_count(), 0);
    assert!(!track.is_active());

    // The jump stays inside the guard window for a few more frames.
    let mut outcomes = vec![];
    for _ in 0..10 {
        outcomes.push(surfer.step(&mut engine, 0.0, 3.0));
    }
    assert!(outcomes[..3]
        .iter()
        .all(|o| matches!(o, FrameOutcome::IdentitySwap { .. })));
    assert!(outcomes[3..].iter().all(|o| *o == FrameOutcome::Inactive));

    let track = engine.track(4).unwrap();
    assert!((track.total_distance() - 30.0).abs() < 1e-9);
    assert_eq!(track.active_frame_count(), 10);
    assert!(!track.is_active());
    assert_eq!(track.maneuver_count(), 1);
}

#[test]
fn concurrent_tracks_are_independent() {
    let mut engine = ManeuverEngine::new(ManeuverConfig::default());
    let mut turning = Surfer::new(10, 200.0, 700.0);
    let mut idle = Surfer::new(11, 1500.0, 300.0);

    for frame in 0..61u64 {
        let heading = match frame {
            0..=14 => 0.0,
            15..=20 => -10.0 * (frame - 14) as f64,
            _ => -60.0,
        };
        if frame > 0 {
            let r = f64::to_radians(heading);
            turning.x += 10.0 * r.cos();
            turning.y += 10.0 * r.sin();
            idle.x += 0.5;
        }
        let detections = [turning.detection(), idle.detection()];
        let ctx = FrameContext {
            frame,
            timestamp_secs: frame as f64 / FPS,
            width: 1920,
            height: 1080,
        };
        let updates = engine.process_frame(&detections, &ctx);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].track_id, 10);
    }

    let finalized = engine.finalize();
    assert_eq!(finalized.len(), 2);
    assert!(matches!(&finalized[0], FinalizedTrack::Export(record) if record.id == 10 && record.total_maneuvers == 1));
    assert_eq!(finalized[1], FinalizedTrack::Discard(11));
}

#[test]
fn slow_drift_through_pi_is_not_a_turn() {
    let mut engine = ManeuverEngine::new(ManeuverConfig::default());
    let mut surfer = Surfer::new(6, 1800.0, 540.0);
    surfer.emit(&mut engine);

    // Right to left, heading drifting 0.25° per frame from 170° to 195°.
    let mut outcomes = vec![];
    for k in 0..100 {
        outcomes.push(surfer.step(&mut engine, 170.0 + 0.25 * k as f64, 10.0));
    }

    let events: Vec<_> = outcomes.iter().filter_map(FrameOutcome::maneuver).collect();
    assert!(events.is_empty(), "events: {events:?}");

    let track = engine.track(6).unwrap();
    assert!(track.is_active());
    // Stored headings stay on the left-pointing side of the circle.
    for heading in track.angles().iter() {
        assert!(heading.abs() > 160.0_f64.to_radians(), "heading {}", heading.to_degrees());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_maneuvers_respect_cooldown(
        turns in prop::collection::vec(-25.0f64..25.0, 150),
        speed in 6.0f64..25.0,
    ) {
        let config = ManeuverConfig::default();
        let mut engine = ManeuverEngine::new(config.clone());
        let mut surfer = Surfer::new(1, 900.0, 500.0);
        surfer.emit(&mut engine);

        let mut heading = 0.0;
        let mut last_seen: Option<u64> = None;
        for delta in turns {
            heading += delta;
            surfer.step(&mut engine, heading, speed);
            let current = engine.track(1).unwrap().last_maneuver_frame();
            prop_assert!(current >= last_seen, "last_maneuver_frame went backwards");
            last_seen = current;
        }

        let track = engine.track(1).unwrap();
        prop_assert_eq!(track.maneuver_count() as usize, track.events().len());
        for pair in track.events().windows(2) {
            prop_assert!(pair[1].frame - pair[0].frame >= config.min_frames_between_maneuvers);
        }

        let expect_export = !track.events().is_empty();
        let finalized = engine.finalize();
        prop_assert_eq!(finalized.len(), 1);
        prop_assert_eq!(matches!(finalized[0], FinalizedTrack::Export(_)), expect_export);
    }
}
