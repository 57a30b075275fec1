//! Merging several track identities into one surfer.
//!
//! Trackers regularly split one physical surfer into multiple identities
//! (occlusion by whitewater, leaving and re-entering the frame). A merge
//! keeps only the selected tracks, folds them into a single record under the
//! lowest selected id, and drops every other track from the results.

use std::collections::HashSet;

use crate::detection::TrackId;
use crate::maneuver::TrackRecord;
use crate::session::{write_json, SessionError, SessionLayout, SessionResults, TrackResult};

/// Reasons a merge request is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Session has no results")]
    NoResults,

    #[error("No track ids selected")]
    EmptySelection,

    #[error("Invalid track ids: {0:?}")]
    UnknownIds(Vec<TrackId>),

    #[error("Duplicate track ids provided")]
    DuplicateIds,
}

/// Check that every selected id exists exactly once in the results.
pub fn validate_track_ids(results: &SessionResults, ids: &[TrackId]) -> Result<(), MergeError> {
    if results.surfers.is_empty() {
        return Err(MergeError::NoResults);
    }
    if ids.is_empty() {
        return Err(MergeError::EmptySelection);
    }

    let existing: HashSet<TrackId> = results.ids().into_iter().collect();
    let unknown: Vec<TrackId> = ids
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(MergeError::UnknownIds(unknown));
    }

    let unique: HashSet<&TrackId> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err(MergeError::DuplicateIds);
    }

    Ok(())
}

/// Merge the selected tracks into a single result.
///
/// Events are ordered by timestamp, then frame. Unselected tracks are not
/// part of the returned results.
pub fn merge_tracks(results: &SessionResults, ids: &[TrackId]) -> Result<SessionResults, MergeError> {
    validate_track_ids(results, ids)?;

    let selected: HashSet<TrackId> = ids.iter().copied().collect();
    let merged_id = *ids.iter().min().ok_or(MergeError::EmptySelection)?;

    let mut events = vec![];
    let mut pictures = vec![];
    for surfer in results.surfers.iter().filter(|s| selected.contains(&s.id())) {
        events.extend(surfer.record.events.iter().cloned());
        pictures.extend(surfer.pictures.iter().cloned());
    }
    events.sort_by(|a, b| {
        a.timestamp
            .total_cmp(&b.timestamp)
            .then_with(|| a.frame.cmp(&b.frame))
    });

    let mut merged_from: Vec<TrackId> = ids.to_vec();
    merged_from.sort_unstable();

    let merged = TrackResult {
        record: TrackRecord {
            id: merged_id,
            total_maneuvers: events.len() as u32,
            events,
        },
        pictures,
        merged_from: Some(merged_from),
        merged_at: Some(chrono::Utc::now().to_rfc3339()),
    };

    Ok(SessionResults {
        surfers: vec![merged],
        merged: true,
        original_surfer_count: Some(results.surfers.len()),
    })
}

impl SessionLayout {
    /// Delete the directories of every track not in `keep`.
    ///
    /// Returns the ids whose directories were removed. Failures are logged
    /// and skipped so one stubborn directory does not block the rest.
    pub fn delete_unselected(&self, keep: &[TrackId], all: &[TrackId]) -> Vec<TrackId> {
        let keep: HashSet<TrackId> = keep.iter().copied().collect();
        let mut deleted = vec![];

        for &id in all.iter().filter(|id| !keep.contains(id)) {
            match self.discard_track(id) {
                Ok(true) => {
                    tracing::info!(track_id = id, "Deleted unselected track directory");
                    deleted.push(id);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(track_id = id, "Failed to delete track directory: {e}");
                }
            }
        }

        deleted
    }

    /// Write merged results to `merged.json`.
    pub fn write_merged(&self, results: &SessionResults) -> Result<(), SessionError> {
        write_json(&self.merged_path(), results)
    }
}
