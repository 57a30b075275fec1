//! Frame-sequential maneuver engine.
//!
//! For each tracked person in a frame:
//! signal update → consistency guard → activity gate → detector →
//! (on accept) feature aggregation → classification → event append.

use std::collections::BTreeMap;

use surftrack_model::detection::{Detection, PoseLandmarks, TrackId};
use surftrack_model::geometry::BoundingBox;
use surftrack_model::maneuver::ManeuverEvent;

use crate::classifier::ManeuverClassifier;
use crate::config::ManeuverConfig;
use crate::consistency::{Consistency, ConsistencyGuard};
use crate::detector::{Rejection, TurnDecision, TurnDetector};
use crate::features::FeatureAggregator;
use crate::signal::{Observation, SignalExtractor};
use crate::store::{FinalizedTrack, TrackStore};
use crate::track::TrackState;

/// Frame metadata supplied alongside the detections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame: u64,
    /// Elapsed session time (seconds).
    pub timestamp_secs: f64,
    /// Frame size in pixels; zero disables clipping.
    pub width: u32,
    pub height: u32,
}

/// Result of processing one track in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The track has not travelled enough to be considered.
    Inactive,
    /// Detection skipped because of a recent positional jump.
    IdentitySwap { distance: f64 },
    NoTurn(Rejection),
    Maneuver(ManeuverEvent),
}

impl FrameOutcome {
    pub fn maneuver(&self) -> Option<&ManeuverEvent> {
        match self {
            Self::Maneuver(event) => Some(event),
            _ => None,
        }
    }
}

/// Per-track result of [`ManeuverEngine::process_frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    pub track_id: TrackId,
    /// Detection box as received.
    pub bbox: BoundingBox,
    pub pose_landmarks: Option<PoseLandmarks>,
    pub outcome: FrameOutcome,
    /// Maneuvers accepted for this track so far, including this frame.
    pub maneuver_count: u32,
}

pub struct ManeuverEngine {
    config: ManeuverConfig,
    store: TrackStore,
    signal: SignalExtractor,
    guard: ConsistencyGuard,
    detector: TurnDetector,
    aggregator: FeatureAggregator,
    classifier: ManeuverClassifier,
    frames_processed: u64,
}

impl ManeuverEngine {
    pub fn new(config: ManeuverConfig) -> Self {
        Self {
            store: TrackStore::new(config.history_capacity),
            signal: SignalExtractor::new(&config),
            guard: ConsistencyGuard::new(config.consistency_window, config.max_jump_px),
            detector: TurnDetector::new(&config),
            aggregator: FeatureAggregator::new(&config),
            classifier: ManeuverClassifier::new(config.classifier.clone()),
            frames_processed: 0,
            config,
        }
    }

    pub fn config(&self) -> &ManeuverConfig {
        &self.config
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackState> {
        self.store.get(id)
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Tracked person detections worth feeding to the engine: person class,
    /// tracker id assigned, confident enough, finite box. When a tracker
    /// reports one id twice, the larger box wins. Sorted by track id.
    pub fn select_detections<'a>(&self, detections: &'a [Detection]) -> Vec<(TrackId, &'a Detection)> {
        let mut selected: BTreeMap<TrackId, &'a Detection> = BTreeMap::new();
        for det in detections {
            let Some(id) = det.track_id else { continue };
            if det.class_id != self.config.person_class_id
                || det.confidence < self.config.min_confidence
                || !det.bbox.center().is_finite()
            {
                continue;
            }
            match selected.get(&id) {
                Some(existing) if existing.bbox.area() >= det.bbox.area() => {
                    tracing::debug!(track_id = id, "Duplicate track id in frame, keeping larger box");
                }
                _ => {
                    selected.insert(id, det);
                }
            }
        }
        selected.into_iter().collect()
    }

    /// Advance every track seen in this frame.
    pub fn process_frame(&mut self, detections: &[Detection], ctx: &FrameContext) -> Vec<TrackUpdate> {
        self.frames_processed += 1;
        let selected = self.select_detections(detections);
        tracing::trace!(
            frame = ctx.frame,
            received = detections.len(),
            tracked = selected.len(),
            "Processing frame"
        );

        selected
            .into_iter()
            .map(|(id, det)| {
                let outcome = self.process_track(id, det, ctx);
                let maneuver_count = self.store.get(id).map_or(0, TrackState::maneuver_count);
                TrackUpdate {
                    track_id: id,
                    bbox: det.bbox,
                    pose_landmarks: det.pose_landmarks.clone(),
                    outcome,
                    maneuver_count,
                }
            })
            .collect()
    }

    fn process_track(&mut self, id: TrackId, det: &Detection, ctx: &FrameContext) -> FrameOutcome {
        let roi = if ctx.width > 0 && ctx.height > 0 {
            det.bbox.clipped(ctx.width, ctx.height)
        } else {
            det.bbox
        };
        let observation = Observation {
            frame: ctx.frame,
            timestamp_secs: ctx.timestamp_secs,
            centroid: det.bbox.center(),
            roi,
            landmarks: det.pose_landmarks.as_ref(),
        };

        let track = self.store.create(id, ctx.frame);
        self.signal.update(track, &observation);

        if let Consistency::Jump { distance } = self.guard.check(track.trajectory()) {
            tracing::debug!(
                track_id = id,
                frame = ctx.frame,
                distance,
                "Trajectory inconsistent, skipping detection"
            );
            return FrameOutcome::IdentitySwap { distance };
        }

        if !track.is_active() {
            return FrameOutcome::Inactive;
        }

        let metrics = match self.detector.detect(
            track.angles(),
            track.timestamps(),
            track.last_maneuver_frame(),
            ctx.frame,
        ) {
            TurnDecision::Accepted(metrics) => metrics,
            TurnDecision::Rejected(rejection) => {
                tracing::trace!(track_id = id, frame = ctx.frame, reason = rejection.as_str(), "No turn");
                return FrameOutcome::NoTurn(rejection);
            }
        };

        let (pose, trajectory) = self.aggregator.aggregate(track);
        let maneuver_type = self.classifier.classify(&metrics, pose.as_ref(), trajectory.as_ref());

        let event = ManeuverEvent {
            frame: ctx.frame,
            timestamp: ctx.timestamp_secs,
            maneuver_type,
            metrics,
            pose_features: pose,
            trajectory_features: trajectory,
        };
        track.push_event(event.clone());

        tracing::info!(
            track_id = id,
            frame = ctx.frame,
            maneuver = %maneuver_type,
            direction = metrics.direction.as_str(),
            angle_deg = metrics.angle_deg,
            angular_speed = metrics.angular_speed_deg_s,
            count = track.maneuver_count(),
            "Maneuver detected"
        );

        FrameOutcome::Maneuver(event)
    }

    /// Drain every track. See [`TrackStore::finalize`].
    pub fn finalize(&mut self) -> Vec<FinalizedTrack> {
        self.store.finalize()
    }
}
