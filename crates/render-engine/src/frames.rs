//! Frame sources and sinks for offline rendering.
//!
//! Video decode/encode is handled outside SurfTrack; frames travel as
//! numbered PNG files (`frame_000000.png`, `frame_000001.png`, …).

use std::path::{Path, PathBuf};

use image::RgbImage;
use surftrack_common::error::{SurftrackError, SurftrackResult};

/// File name of a numbered frame.
pub fn frame_file_name(frame: u64) -> String {
    format!("frame_{frame:06}.png")
}

/// Supplies decoded frames by index.
pub trait FrameSource {
    /// Frame `index`, or `None` past the end of the stream.
    fn read_frame(&mut self, index: u64) -> SurftrackResult<Option<RgbImage>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Receives rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, index: u64, image: &RgbImage) -> SurftrackResult<()>;

    fn name(&self) -> &str;
}

/// Numbered PNG files in a directory.
#[derive(Debug, Clone)]
pub struct ImageDirSource {
    dir: PathBuf,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> SurftrackResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(SurftrackError::FileNotFound { path: dir });
        }
        Ok(Self { dir })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(frame_file_name(index))
    }
}

impl FrameSource for ImageDirSource {
    fn read_frame(&mut self, index: u64) -> SurftrackResult<Option<RgbImage>> {
        let path = self.frame_path(index);
        if !path.exists() {
            return Ok(None);
        }
        let image = image::open(&path)
            .map_err(|e| SurftrackError::input(format!("Failed to decode {}: {e}", path.display())))?;
        Ok(Some(image.to_rgb8()))
    }

    fn name(&self) -> &str {
        "image-dir"
    }
}

/// Writes numbered PNG files into a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct ImageDirSink {
    dir: PathBuf,
}

impl ImageDirSink {
    pub fn create(dir: impl AsRef<Path>) -> SurftrackResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl FrameSink for ImageDirSink {
    fn write_frame(&mut self, index: u64, image: &RgbImage) -> SurftrackResult<()> {
        let path = self.dir.join(frame_file_name(index));
        image
            .save(&path)
            .map_err(|e| SurftrackError::render(format!("Failed to write {}: {e}", path.display())))
    }

    fn name(&self) -> &str {
        "image-dir"
    }
}
