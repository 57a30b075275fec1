//! Session output layout and result collection.
//!
//! A session directory holds everything one processed video produces:
//!
//! ```text
//! <root>/
//!   tracking_data.jsonl          per-frame detection log (replay input)
//!   summary.json                 aggregate counts
//!   merged.json                  written after a track merge
//!   elements/<track_id>/
//!     maneuvers.json             exported TrackRecord
//!     pictures/frame_000123.png  evidence frames
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::TrackId;
use crate::maneuver::TrackRecord;

const ELEMENTS_DIR: &str = "elements";
const PICTURES_DIR: &str = "pictures";
const RECORD_FILE: &str = "maneuvers.json";
const TRACKING_LOG_FILE: &str = "tracking_data.jsonl";
const SUMMARY_FILE: &str = "summary.json";
const MERGED_FILE: &str = "merged.json";

/// Path helpers for a session output directory.
#[derive(Debug, Clone)]
pub struct SessionLayout {
    root: PathBuf,
}

impl SessionLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn elements_dir(&self) -> PathBuf {
        self.root.join(ELEMENTS_DIR)
    }

    /// Directory owned by one track.
    pub fn track_dir(&self, id: TrackId) -> PathBuf {
        self.elements_dir().join(id.to_string())
    }

    pub fn pictures_dir(&self, id: TrackId) -> PathBuf {
        self.track_dir(id).join(PICTURES_DIR)
    }

    /// Evidence image path for a frame, keyed by frame index.
    pub fn picture_path(&self, id: TrackId, frame: u64) -> PathBuf {
        self.pictures_dir(id).join(format!("frame_{frame:06}.png"))
    }

    pub fn record_path(&self, id: TrackId) -> PathBuf {
        self.track_dir(id).join(RECORD_FILE)
    }

    pub fn tracking_log_path(&self) -> PathBuf {
        self.root.join(TRACKING_LOG_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.root.join(MERGED_FILE)
    }

    /// Write a track's record to `elements/<id>/maneuvers.json`.
    pub fn write_record(&self, record: &TrackRecord) -> Result<PathBuf, SessionError> {
        let dir = self.track_dir(record.id);
        std::fs::create_dir_all(&dir).map_err(|e| SessionError::IoError {
            path: dir.clone(),
            source: e,
        })?;

        let path = self.record_path(record.id);
        write_json(&path, record)?;
        Ok(path)
    }

    /// Read a track's exported record.
    pub fn read_record(&self, id: TrackId) -> Result<TrackRecord, SessionError> {
        read_json(&self.record_path(id))
    }

    /// Remove every artifact of a track. Returns whether anything was removed.
    pub fn discard_track(&self, id: TrackId) -> Result<bool, SessionError> {
        let dir = self.track_dir(id);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir).map_err(|e| SessionError::IoError {
            path: dir,
            source: e,
        })?;
        Ok(true)
    }

    /// Sorted evidence picture paths of a track.
    pub fn list_pictures(&self, id: TrackId) -> Result<Vec<PathBuf>, SessionError> {
        let dir = self.pictures_dir(id);
        if !dir.exists() {
            return Ok(vec![]);
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| SessionError::IoError {
            path: dir.clone(),
            source: e,
        })?;

        let mut pictures: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pictures.sort();
        Ok(pictures)
    }

    pub fn write_summary(&self, summary: &SessionSummary) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.root).map_err(|e| SessionError::IoError {
            path: self.root.clone(),
            source: e,
        })?;
        write_json(&self.summary_path(), summary)
    }

    pub fn read_summary(&self) -> Result<Option<SessionSummary>, SessionError> {
        let path = self.summary_path();
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

/// Aggregate counts reported at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub tracks_total: usize,
    pub tracks_exported: usize,
    pub tracks_discarded: usize,
    pub maneuvers_total: u64,
}

/// One exported track plus its evidence pictures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResult {
    #[serde(flatten)]
    pub record: TrackRecord,
    #[serde(default)]
    pub pictures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<Vec<TrackId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
}

impl TrackResult {
    pub fn id(&self) -> TrackId {
        self.record.id
    }
}

/// All exported tracks of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub surfers: Vec<TrackResult>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_surfer_count: Option<usize>,
}

impl SessionResults {
    /// Collect every `elements/<id>/maneuvers.json` under a session root.
    ///
    /// Directories without a record are skipped. Results are sorted by id.
    pub fn collect(root: impl AsRef<Path>) -> Result<Self, SessionError> {
        let layout = SessionLayout::new(root);
        let elements = layout.elements_dir();
        if !elements.exists() {
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&elements).map_err(|e| SessionError::IoError {
            path: elements.clone(),
            source: e,
        })?;

        let mut surfers = vec![];
        for entry in entries.filter_map(Result::ok) {
            let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<TrackId>().ok())
            else {
                continue;
            };
            if !layout.record_path(id).exists() {
                tracing::debug!(track_id = id, "Skipping track directory without record");
                continue;
            }

            let record = layout.read_record(id)?;
            let pictures = layout
                .list_pictures(id)?
                .into_iter()
                .map(|p| p.display().to_string())
                .collect();
            surfers.push(TrackResult {
                record,
                pictures,
                merged_from: None,
                merged_at: None,
            });
        }
        surfers.sort_by_key(TrackResult::id);

        Ok(Self {
            surfers,
            merged: false,
            original_surfer_count: None,
        })
    }

    /// Current results of a session: `merged.json` once a merge has been
    /// written, the per-track records otherwise.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, SessionError> {
        let merged = SessionLayout::new(root.as_ref()).merged_path();
        if merged.exists() {
            return read_json(&merged);
        }
        Self::collect(root)
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.surfers.iter().map(TrackResult::id).collect()
    }

    pub fn total_maneuvers(&self) -> u64 {
        self.surfers
            .iter()
            .map(|s| s.record.total_maneuvers as u64)
            .sum()
    }
}

/// Errors that can occur when reading or writing session output.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| SessionError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| SessionError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SessionError> {
    let content = std::fs::read_to_string(path).map_err(|e| SessionError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| SessionError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
