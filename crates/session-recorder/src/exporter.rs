//! End-of-stream export: a track is either written out in full or erased.

use std::path::PathBuf;

use surftrack_common::error::SurftrackResult;
use surftrack_core::FinalizedTrack;
use surftrack_model::detection::TrackId;
use surftrack_model::session::SessionLayout;

/// What an export pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Written record paths, by track id.
    pub exported: Vec<(TrackId, PathBuf)>,
    pub discarded: Vec<TrackId>,
    pub maneuvers_total: u64,
}

impl ExportReport {
    pub fn tracks_total(&self) -> usize {
        self.exported.len() + self.discarded.len()
    }
}

#[derive(Debug, Clone)]
pub struct TrackExporter {
    layout: SessionLayout,
}

impl TrackExporter {
    pub fn new(layout: SessionLayout) -> Self {
        Self { layout }
    }

    /// Write `maneuvers.json` for tracks with maneuvers and delete the
    /// directory of every other track (including any stray evidence).
    pub fn export(&self, tracks: Vec<FinalizedTrack>) -> SurftrackResult<ExportReport> {
        let mut report = ExportReport::default();

        for track in tracks {
            match track {
                FinalizedTrack::Export(record) => {
                    let path = self.layout.write_record(&record).map_err(anyhow::Error::from)?;
                    tracing::info!(
                        track_id = record.id,
                        maneuvers = record.total_maneuvers,
                        path = %path.display(),
                        "Exported track"
                    );
                    report.maneuvers_total += u64::from(record.total_maneuvers);
                    report.exported.push((record.id, path));
                }
                FinalizedTrack::Discard(id) => {
                    if self.layout.discard_track(id).map_err(anyhow::Error::from)? {
                        tracing::debug!(track_id = id, "Removed artifacts of track without maneuvers");
                    }
                    report.discarded.push(id);
                }
            }
        }

        Ok(report)
    }
}
