//! Mutable per-track state owned by the [`TrackStore`](crate::store::TrackStore).

use surftrack_model::detection::TrackId;
use surftrack_model::geometry::Point2D;
use surftrack_model::maneuver::{ManeuverEvent, PoseFeatures, TrackRecord};

use crate::history::History;

/// Everything the engine remembers about one tracked surfer.
///
/// Histories are bounded rings of equal capacity. `angles` lags
/// `trajectory` by one element; `timestamps` holds one entry per trajectory
/// point, so it is tail-aligned with `angles`.
#[derive(Debug, Clone)]
pub struct TrackState {
    pub(crate) id: TrackId,
    pub(crate) trajectory: History<Point2D>,
    pub(crate) angles: History<f64>,
    pub(crate) timestamps: History<f64>,
    pub(crate) pose_history: History<Option<PoseFeatures>>,
    pub(crate) maneuver_count: u32,
    pub(crate) last_maneuver_frame: Option<u64>,
    pub(crate) total_distance: f64,
    pub(crate) active_frame_count: u32,
    pub(crate) is_active: bool,
    pub(crate) events: Vec<ManeuverEvent>,
    pub(crate) y_range: Option<(f64, f64)>,
    pub(crate) first_frame: u64,
    pub(crate) last_frame: u64,
}

impl TrackState {
    pub fn new(id: TrackId, capacity: usize, first_frame: u64) -> Self {
        Self {
            id,
            trajectory: History::new(capacity),
            angles: History::new(capacity),
            timestamps: History::new(capacity),
            pose_history: History::new(capacity),
            maneuver_count: 0,
            last_maneuver_frame: None,
            total_distance: 0.0,
            active_frame_count: 0,
            is_active: false,
            events: Vec::new(),
            y_range: None,
            first_frame,
            last_frame: first_frame,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn trajectory(&self) -> &History<Point2D> {
        &self.trajectory
    }

    /// Smoothed motion angles in radians.
    pub fn angles(&self) -> &History<f64> {
        &self.angles
    }

    pub fn timestamps(&self) -> &History<f64> {
        &self.timestamps
    }

    pub fn pose_history(&self) -> &History<Option<PoseFeatures>> {
        &self.pose_history
    }

    pub fn maneuver_count(&self) -> u32 {
        self.maneuver_count
    }

    pub fn last_maneuver_frame(&self) -> Option<u64> {
        self.last_maneuver_frame
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn active_frame_count(&self) -> u32 {
        self.active_frame_count
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn events(&self) -> &[ManeuverEvent] {
        &self.events
    }

    /// Smallest centroid y seen so far.
    pub fn min_y(&self) -> Option<f64> {
        self.y_range.map(|(min, _)| min)
    }

    /// Largest centroid y seen so far.
    pub fn max_y(&self) -> Option<f64> {
        self.y_range.map(|(_, max)| max)
    }

    /// Frames spanned by this track's sightings.
    pub fn frame_span(&self) -> (u64, u64) {
        (self.first_frame, self.last_frame)
    }

    pub(crate) fn observe_y(&mut self, y: f64) {
        self.y_range = Some(match self.y_range {
            Some((min, max)) => (min.min(y), max.max(y)),
            None => (y, y),
        });
    }

    /// Clear activity accounting after an identity swap.
    pub(crate) fn reset_activity(&mut self) {
        self.total_distance = 0.0;
        self.active_frame_count = 0;
        self.is_active = false;
    }

    /// Append an accepted maneuver. Frames must not go backwards.
    pub(crate) fn push_event(&mut self, event: ManeuverEvent) {
        debug_assert!(self.last_maneuver_frame.map_or(true, |last| event.frame >= last));
        self.last_maneuver_frame = Some(event.frame);
        self.maneuver_count += 1;
        self.events.push(event);
    }

    /// Exportable record of the accepted maneuvers.
    pub fn record(&self) -> TrackRecord {
        TrackRecord {
            id: self.id,
            total_maneuvers: self.maneuver_count,
            events: self.events.clone(),
        }
    }

    pub fn into_record(self) -> TrackRecord {
        TrackRecord {
            id: self.id,
            total_maneuvers: self.maneuver_count,
            events: self.events,
        }
    }
}
