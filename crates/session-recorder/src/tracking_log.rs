//! Append-only detection log (`tracking_data.jsonl`).
//!
//! First line is a `#`-prefixed [`VideoInfo`] header, then one
//! [`TrackedFrame`] per processed frame. The replay tool reads this back to
//! redraw overlays without running detection again.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use surftrack_common::error::{SurftrackError, SurftrackResult};
use surftrack_model::detection::{TrackedFrame, VideoInfo};

/// Frames between forced flushes.
const FLUSH_INTERVAL: u64 = 100;

pub struct TrackingLogWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    frames_written: u64,
}

impl TrackingLogWriter {
    /// Create the log, truncating any previous one, and write the header.
    pub fn create(path: impl AsRef<Path>, video: &VideoInfo) -> SurftrackResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let header = serde_json::to_string(video)?;
        writeln!(writer, "# {header}")
            .map_err(|e| SurftrackError::export(format!("Failed to write log header: {e}")))?;

        Ok(Self {
            writer,
            path,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &TrackedFrame) -> SurftrackResult<()> {
        let json = serde_json::to_string(frame)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| SurftrackError::export(format!("Failed to write frame {}: {e}", frame.frame)))?;
        self.frames_written += 1;

        if self.frames_written % FLUSH_INTERVAL == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> SurftrackResult<()> {
        self.writer
            .flush()
            .map_err(|e| SurftrackError::export(format!("Failed to flush tracking log: {e}")))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TrackingLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
