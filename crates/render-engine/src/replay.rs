//! Allow-list replay: redraw a processed session keeping only selected tracks.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use surftrack_common::error::{SurftrackError, SurftrackResult};
use surftrack_model::detection::{parse_tracked_frames, TrackId, TrackedDetection, TrackedFrame};

use crate::frames::{FrameSink, FrameSource};
use crate::overlay::OverlayRenderer;

/// Per-frame detections to draw, already filtered to the allow-list.
#[derive(Debug, Clone, Default)]
pub struct ReplayPlan {
    frames: HashMap<u64, Vec<TrackedDetection>>,
    allowed: HashSet<TrackId>,
}

impl ReplayPlan {
    pub fn new(frames: Vec<TrackedFrame>, allowed: impl IntoIterator<Item = TrackId>) -> Self {
        let allowed: HashSet<TrackId> = allowed.into_iter().collect();
        let frames = frames
            .into_iter()
            .filter_map(|f| {
                let kept: Vec<TrackedDetection> = f
                    .detections
                    .into_iter()
                    .filter(|d| allowed.contains(&d.track_id))
                    .collect();
                (!kept.is_empty()).then_some((f.frame, kept))
            })
            .collect();
        Self { frames, allowed }
    }

    /// Build a plan from a `tracking_data.jsonl` file.
    pub fn from_tracking_log(
        path: impl AsRef<Path>,
        allowed: impl IntoIterator<Item = TrackId>,
    ) -> SurftrackResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| SurftrackError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(parse_tracked_frames(&content)?, allowed))
    }

    pub fn is_allowed(&self, id: TrackId) -> bool {
        self.allowed.contains(&id)
    }

    pub fn detections(&self, frame: u64) -> &[TrackedDetection] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of frames with at least one allowed detection.
    pub fn frames_with_overlays(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub frames_rendered: u64,
    pub detections_drawn: u64,
}

/// Read frames from `source` starting at 0 until it runs out, draw the
/// planned overlays and pass every frame to `sink`. Frames without planned
/// detections are written unchanged.
pub fn replay_session(
    plan: &ReplayPlan,
    source: &mut impl FrameSource,
    sink: &mut impl FrameSink,
    renderer: &OverlayRenderer,
) -> SurftrackResult<ReplayStats> {
    tracing::info!(
        source = source.name(),
        sink = sink.name(),
        frames_with_overlays = plan.frames_with_overlays(),
        has_font = renderer.has_font(),
        "Replay started"
    );

    let mut stats = ReplayStats::default();
    let mut index = 0u64;
    while let Some(mut image) = source.read_frame(index)? {
        let detections = plan.detections(index);
        renderer.draw_frame(&mut image, detections);
        sink.write_frame(index, &image)?;

        stats.frames_rendered += 1;
        stats.detections_drawn += detections.len() as u64;
        if stats.frames_rendered % 100 == 0 {
            tracing::debug!(frames = stats.frames_rendered, "Replay progress");
        }
        index += 1;
    }

    tracing::info!(
        frames = stats.frames_rendered,
        detections = stats.detections_drawn,
        "Replay finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use surftrack_model::geometry::BoundingBox;

    struct MemorySource {
        frames: Vec<RgbImage>,
    }

    impl FrameSource for MemorySource {
        fn read_frame(&mut self, index: u64) -> SurftrackResult<Option<RgbImage>> {
            Ok(self.frames.get(index as usize).cloned())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: Vec<(u64, RgbImage)>,
    }

    impl FrameSink for MemorySink {
        fn write_frame(&mut self, index: u64, image: &RgbImage) -> SurftrackResult<()> {
            self.written.push((index, image.clone()));
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    fn tracked(id: TrackId, x: f64) -> TrackedDetection {
        TrackedDetection {
            track_id: id,
            bbox: BoundingBox::new(x, 100.0, x + 40.0, 180.0),
            maneuver_count: 0,
            pose_landmarks: None,
        }
    }

    fn log() -> Vec<TrackedFrame> {
        vec![
            TrackedFrame {
                frame: 0,
                detections: vec![tracked(1, 20.0), tracked(2, 120.0)],
            },
            TrackedFrame {
                frame: 1,
                detections: vec![tracked(2, 120.0)],
            },
        ]
    }

    #[test]
    fn test_plan_keeps_only_allowed_ids() {
        let plan = ReplayPlan::new(log(), [1]);
        assert!(plan.is_allowed(1));
        assert!(!plan.is_allowed(2));
        assert_eq!(plan.detections(0).len(), 1);
        assert_eq!(plan.detections(0)[0].track_id, 1);
        assert!(plan.detections(1).is_empty());
        assert_eq!(plan.frames_with_overlays(), 1);
    }

    #[test]
    fn test_replay_draws_allowed_tracks_only() {
        let background = Rgb([5, 5, 5]);
        let mut source = MemorySource {
            frames: vec![RgbImage::from_pixel(240, 240, background); 3],
        };
        let mut sink = MemorySink::default();
        let renderer = OverlayRenderer::default();

        let stats =
            replay_session(&ReplayPlan::new(log(), [1]), &mut source, &mut sink, &renderer).unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                frames_rendered: 3,
                detections_drawn: 1,
            }
        );
        assert_eq!(sink.written.len(), 3);

        let (index, first) = &sink.written[0];
        assert_eq!(*index, 0);
        // Left edge of track 1's box is drawn; track 2's is not.
        assert_eq!(first.get_pixel(20, 150), &renderer.style().box_color);
        assert_eq!(first.get_pixel(120, 150), &background);
        // Frames without overlays pass through untouched.
        assert!(sink.written[2].1.pixels().all(|p| *p == background));
    }

    #[test]
    fn test_plan_from_tracking_log_file() {
        let dir = std::env::temp_dir().join("surftrack_test_replay_plan");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tracking_data.jsonl");

        let mut content = String::from("# {\"fps\":30.0,\"width\":240,\"height\":240}\n");
        for frame in log() {
            content.push_str(&serde_json::to_string(&frame).unwrap());
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();

        let plan = ReplayPlan::from_tracking_log(&path, [2]).unwrap();
        assert_eq!(plan.frames_with_overlays(), 2);

        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(
            ReplayPlan::from_tracking_log(&path, [2]),
            Err(SurftrackError::FileNotFound { .. })
        ));
    }
}
