//! Arena of per-track state, keyed by tracker id.

use std::collections::BTreeMap;

use surftrack_model::detection::TrackId;
use surftrack_model::maneuver::TrackRecord;

use crate::track::TrackState;

/// What happens to a track at end of stream.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizedTrack {
    /// At least one maneuver: write the record.
    Export(TrackRecord),
    /// No maneuvers: remove every artifact of the track.
    Discard(TrackId),
}

impl FinalizedTrack {
    pub fn track_id(&self) -> TrackId {
        match self {
            Self::Export(record) => record.id,
            Self::Discard(id) => *id,
        }
    }
}

/// Exclusive owner of every live [`TrackState`].
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: BTreeMap<TrackId, TrackState>,
    capacity: usize,
}

impl TrackStore {
    /// `capacity` is the history capacity given to each new track.
    pub fn new(capacity: usize) -> Self {
        Self {
            tracks: BTreeMap::new(),
            capacity,
        }
    }

    /// Register a track on its first sighting. An existing track is
    /// returned unchanged.
    pub fn create(&mut self, id: TrackId, frame: u64) -> &mut TrackState {
        let capacity = self.capacity;
        self.tracks.entry(id).or_insert_with(|| {
            tracing::debug!(track_id = id, frame, "New track");
            TrackState::new(id, capacity, frame)
        })
    }

    pub fn get(&self, id: TrackId) -> Option<&TrackState> {
        self.tracks.get(&id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut TrackState> {
        self.tracks.get_mut(&id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackState> {
        self.tracks.values()
    }

    /// Drain every track into its end-of-stream fate, in ascending id order.
    pub fn finalize(&mut self) -> Vec<FinalizedTrack> {
        let tracks = std::mem::take(&mut self.tracks);
        let finalized: Vec<FinalizedTrack> = tracks
            .into_values()
            .map(|track| {
                let (first, last) = track.frame_span();
                tracing::debug!(
                    track_id = track.id(),
                    first_frame = first,
                    last_frame = last,
                    maneuvers = track.maneuver_count(),
                    min_y = track.min_y(),
                    max_y = track.max_y(),
                    "Finalizing track"
                );
                if track.maneuver_count() > 0 {
                    FinalizedTrack::Export(track.into_record())
                } else {
                    FinalizedTrack::Discard(track.id())
                }
            })
            .collect();

        let exported = finalized
            .iter()
            .filter(|f| matches!(f, FinalizedTrack::Export(_)))
            .count();
        tracing::info!(
            total = finalized.len(),
            with_maneuvers = exported,
            discarded = finalized.len() - exported,
            "Finalized tracks"
        );
        finalized
    }
}
