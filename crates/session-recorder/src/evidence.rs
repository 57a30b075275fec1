//! Evidence frames for accepted maneuvers.

use std::path::PathBuf;

use image::RgbImage;
use surftrack_common::error::{SurftrackError, SurftrackResult};
use surftrack_model::detection::TrackId;
use surftrack_model::geometry::BoundingBox;
use surftrack_model::session::SessionLayout;

/// Destination for per-maneuver evidence images.
pub trait EvidenceSink {
    /// Persist the evidence for a maneuver of `track_id` at `frame`.
    /// Returns the written path, or `None` when nothing was stored.
    fn capture(
        &mut self,
        track_id: TrackId,
        frame: u64,
        image: &RgbImage,
        roi: &BoundingBox,
    ) -> SurftrackResult<Option<PathBuf>>;
}

/// Sink that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEvidence;

impl EvidenceSink for NullEvidence {
    fn capture(&mut self, _: TrackId, _: u64, _: &RgbImage, _: &BoundingBox) -> SurftrackResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// Writes a PNG crop around the surfer to
/// `elements/<id>/pictures/frame_<frame>.png`.
#[derive(Debug, Clone)]
pub struct PngEvidenceStore {
    layout: SessionLayout,
    /// Extra context around the box, as a fraction of its size per side.
    margin: f64,
}

impl PngEvidenceStore {
    pub fn new(layout: SessionLayout) -> Self {
        Self { layout, margin: 0.25 }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin.max(0.0);
        self
    }
}

impl EvidenceSink for PngEvidenceStore {
    fn capture(
        &mut self,
        track_id: TrackId,
        frame: u64,
        image: &RgbImage,
        roi: &BoundingBox,
    ) -> SurftrackResult<Option<PathBuf>> {
        let Some(crop) = crop_around(image, roi, self.margin) else {
            tracing::debug!(track_id, frame, "Evidence box outside the frame, skipping");
            return Ok(None);
        };

        let path = self.layout.picture_path(track_id, frame);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        crop.save(&path).map_err(|e| {
            SurftrackError::evidence(format!("Failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!(track_id, frame, path = %path.display(), "Saved evidence frame");
        Ok(Some(path))
    }
}

/// Crop `roi` grown by `margin` on every side, clipped to the image.
/// `None` when nothing of the box is inside the image.
pub fn crop_around(image: &RgbImage, roi: &BoundingBox, margin: f64) -> Option<RgbImage> {
    let pad_x = roi.width() * margin;
    let pad_y = roi.height() * margin;
    let grown = BoundingBox::new(roi.x1 - pad_x, roi.y1 - pad_y, roi.x2 + pad_x, roi.y2 + pad_y)
        .clipped(image.width(), image.height());

    let x = grown.x1.floor() as u32;
    let y = grown.y1.floor() as u32;
    let w = (grown.x2.ceil() as u32).saturating_sub(x);
    let h = (grown.y2.ceil() as u32).saturating_sub(y);
    if w == 0 || h == 0 {
        return None;
    }
    Some(image::imageops::crop_imm(image, x, y, w, h).to_image())
}
