//! Per-detection overlay: bounding box, pose skeleton, and a label box with
//! the track id and its running maneuver count.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use surftrack_common::error::{SurftrackError, SurftrackResult};
use surftrack_model::detection::{PoseLandmarks, TrackedDetection, POSE_CONNECTIONS};
use surftrack_model::geometry::{BoundingBox, Point2D};

#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub box_color: Rgb<u8>,
    pub skeleton_color: Rgb<u8>,
    pub joint_color: Rgb<u8>,
    pub label_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    /// Box outline thickness in pixels.
    pub thickness: u32,
    pub joint_radius: i32,
    /// Text height in pixels.
    pub text_scale: f32,
    /// Landmarks at or below this visibility are not drawn.
    pub min_visibility: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            box_color: Rgb([0, 255, 0]),
            skeleton_color: Rgb([0, 255, 0]),
            joint_color: Rgb([255, 64, 64]),
            label_color: Rgb([0, 255, 0]),
            text_color: Rgb([0, 0, 0]),
            thickness: 2,
            joint_radius: 2,
            text_scale: 20.0,
            min_visibility: 0.5,
        }
    }
}

/// Draws overlays onto RGB frames. Without a font the label box is still
/// drawn, just empty.
pub struct OverlayRenderer {
    style: OverlayStyle,
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style, font: None }
    }

    /// Load a TrueType/OpenType font for label text.
    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> SurftrackResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|_| SurftrackError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| SurftrackError::render(format!("Invalid font {}: {e}", path.display())))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn draw_frame(&self, image: &mut RgbImage, detections: &[TrackedDetection]) {
        for det in detections {
            self.draw_detection(image, det);
        }
    }

    pub fn draw_detection(&self, image: &mut RgbImage, det: &TrackedDetection) {
        let Some(rect) = pixel_rect(&det.bbox) else {
            return;
        };
        for inset in 0..self.style.thickness {
            if let Some(r) = inset_rect(rect, inset) {
                draw_hollow_rect_mut(image, r, self.style.box_color);
            }
        }

        if let Some(landmarks) = &det.pose_landmarks {
            // Pose runs on the part of the box inside the frame.
            let roi = det.bbox.clipped(image.width(), image.height());
            self.draw_skeleton(image, &roi, landmarks);
        }

        self.draw_label(
            image,
            &det.bbox,
            &[format!("ID: {}", det.track_id), format!("Maneuvers: {}", det.maneuver_count)],
        );
    }

    /// Landmarks are normalized to `bbox`.
    fn draw_skeleton(&self, image: &mut RgbImage, bbox: &BoundingBox, landmarks: &PoseLandmarks) {
        let to_pixel = |i: usize| -> Option<Point2D> {
            let lm = landmarks.0.get(i)?;
            if lm.visibility <= self.style.min_visibility {
                return None;
            }
            let p = Point2D::new(bbox.x1 + lm.x * bbox.width(), bbox.y1 + lm.y * bbox.height());
            p.is_finite().then_some(p)
        };

        for &(a, b) in POSE_CONNECTIONS {
            if let (Some(pa), Some(pb)) = (to_pixel(a), to_pixel(b)) {
                draw_line_segment_mut(
                    image,
                    (pa.x as f32, pa.y as f32),
                    (pb.x as f32, pb.y as f32),
                    self.style.skeleton_color,
                );
            }
        }
        for p in (0..landmarks.len()).filter_map(to_pixel) {
            draw_filled_circle_mut(
                image,
                (p.x.round() as i32, p.y.round() as i32),
                self.style.joint_radius,
                self.style.joint_color,
            );
        }
    }

    /// Filled box above the detection (clamped to the top edge), one text
    /// line per entry.
    fn draw_label(&self, image: &mut RgbImage, bbox: &BoundingBox, lines: &[String]) {
        let scale = PxScale::from(self.style.text_scale);
        let sizes: Vec<(u32, u32)> = lines.iter().map(|line| self.measure(scale, line)).collect();
        let text_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
        let text_h: u32 = sizes.iter().map(|s| s.1).sum();

        let box_w = text_w + 16;
        let box_h = text_h + 8 * lines.len() as u32 + 4;
        let x = bbox.x1.round() as i32;
        let y = (bbox.y1.round() as i32 - box_h as i32).max(0);
        draw_filled_rect_mut(image, Rect::at(x, y).of_size(box_w, box_h), self.style.label_color);

        let Some(font) = &self.font else {
            return;
        };
        let mut cursor_y = y + 4;
        for (line, (_, h)) in lines.iter().zip(&sizes) {
            draw_text_mut(image, self.style.text_color, x + 8, cursor_y, scale, font, line);
            cursor_y += *h as i32 + 8;
        }
    }

    fn measure(&self, scale: PxScale, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(scale, font, text),
            // Rough advance for a sans-serif face.
            None => (
                (text.chars().count() as f32 * scale.x * 0.55).ceil() as u32,
                scale.y.ceil() as u32,
            ),
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

/// Integer rectangle of a box, or `None` when degenerate.
fn pixel_rect(bbox: &BoundingBox) -> Option<Rect> {
    let x = bbox.x1.round();
    let y = bbox.y1.round();
    let w = (bbox.x2.round() - x) as i64;
    let h = (bbox.y2.round() - y) as i64;
    if !(x.is_finite() && y.is_finite()) || w <= 0 || h <= 0 {
        return None;
    }
    Some(Rect::at(x as i32, y as i32).of_size(w as u32, h as u32))
}

fn inset_rect(rect: Rect, inset: u32) -> Option<Rect> {
    let w = rect.width().checked_sub(2 * inset)?;
    let h = rect.height().checked_sub(2 * inset)?;
    if w == 0 || h == 0 {
        return None;
    }
    Some(Rect::at(rect.left() + inset as i32, rect.top() + inset as i32).of_size(w, h))
}
