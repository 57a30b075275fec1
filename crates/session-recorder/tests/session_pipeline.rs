use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use surftrack_common::error::{SurftrackError, SurftrackResult};
use surftrack_core::{FrameOutcome, ManeuverConfig};
use surftrack_model::detection::{parse_header, parse_tracked_frames, Detection, FrameDetections, TrackId, VideoInfo};
use surftrack_model::geometry::BoundingBox;
use surftrack_model::merge::merge_tracks;
use surftrack_model::session::{SessionLayout, SessionResults};
use surftrack_recorder::{EvidenceSink, PipelineOptions, SessionPipeline};

const VIDEO: VideoInfo = VideoInfo {
    fps: 30.0,
    width: 640,
    height: 480,
    rotation: 0,
};

fn heading_at(frame: u64) -> f64 {
    match frame {
        0..=14 => 0.0,
        15..=20 => -10.0 * (frame - 14) as f64,
        _ => -60.0,
    }
}

/// Two surfers carving the same left turn plus one bystander drifting slowly.
fn synthetic_session(frames: u64) -> Vec<FrameDetections> {
    let mut surfers: Vec<(TrackId, f64, f64)> = vec![(1, 60.0, 440.0), (5, 500.0, 100.0), (8, 300.0, 440.0)];
    let mut out = vec![];
    for frame in 0..frames {
        if frame > 0 {
            let r = heading_at(frame).to_radians();
            for (id, x, y) in surfers.iter_mut() {
                if *id == 5 {
                    *x += 0.5;
                } else {
                    *x += 10.0 * r.cos();
                    *y += 10.0 * r.sin();
                }
            }
        }
        let mut detections: Vec<Detection> = surfers
            .iter()
            .map(|&(id, x, y)| Detection::person(id, BoundingBox::centered(x, y, 30.0, 60.0)))
            .collect();
        // Noise the engine must ignore.
        let mut board = Detection::person(99, BoundingBox::centered(320.0, 240.0, 80.0, 20.0));
        board.class_id = 37;
        detections.push(board);
        out.push(FrameDetections { frame, detections });
    }
    out
}

fn temp_session(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn exports_only_tracks_with_maneuvers() {
    let dir = temp_session("surftrack_test_pipeline_export");
    let image = RgbImage::from_pixel(VIDEO.width, VIDEO.height, Rgb([20, 90, 160]));

    let mut pipeline =
        SessionPipeline::new(ManeuverConfig::default(), PipelineOptions::new(&dir, VIDEO)).unwrap();
    let mut maneuver_frames = vec![];
    for frame in synthetic_session(61) {
        for update in pipeline.process_frame(&frame, Some(&image)).unwrap() {
            if let FrameOutcome::Maneuver(event) = update.outcome {
                maneuver_frames.push((update.track_id, event.frame));
            }
        }
    }
    assert_eq!(maneuver_frames, vec![(1, 20), (8, 20)]);

    let summary = pipeline.finish().unwrap();
    assert_eq!(summary.frames_processed, 61);
    assert_eq!(summary.tracks_total, 3);
    assert_eq!(summary.tracks_exported, 2);
    assert_eq!(summary.tracks_discarded, 1);
    assert_eq!(summary.maneuvers_total, 2);

    let layout = SessionLayout::new(&dir);
    assert_eq!(layout.read_summary().unwrap(), Some(summary));

    // Events non-empty iff the record exists.
    for id in [1, 8] {
        let record = layout.read_record(id).unwrap();
        assert_eq!(record.total_maneuvers, 1);
        assert!(!record.events.is_empty());
        assert!(layout.picture_path(id, 20).exists());
    }
    assert!(!layout.track_dir(5).exists());
    assert!(!layout.track_dir(99).exists());

    let results = SessionResults::collect(&dir).unwrap();
    assert_eq!(results.ids(), vec![1, 8]);
    assert_eq!(results.surfers[0].pictures.len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn tracking_log_records_consumed_detections() {
    let dir = temp_session("surftrack_test_pipeline_log");
    let options = PipelineOptions {
        capture_evidence: false,
        ..PipelineOptions::new(&dir, VIDEO)
    };
    let mut pipeline = SessionPipeline::new(ManeuverConfig::default(), options).unwrap();
    for frame in synthetic_session(30) {
        pipeline.process_frame(&frame, None).unwrap();
    }
    pipeline.finish().unwrap();

    let layout = SessionLayout::new(&dir);
    let content = std::fs::read_to_string(layout.tracking_log_path()).unwrap();
    assert_eq!(parse_header(&content).unwrap(), Some(VIDEO));

    let frames = parse_tracked_frames(&content).unwrap();
    assert_eq!(frames.len(), 30);
    let ids: Vec<TrackId> = frames[0].detections.iter().map(|d| d.track_id).collect();
    assert_eq!(ids, vec![1, 5, 8]);
    let counts: Vec<u32> = frames[29]
        .detections
        .iter()
        .map(|d| d.maneuver_count)
        .collect();
    assert_eq!(counts, vec![1, 0, 1]);

    // Records still exist even without evidence capture.
    assert!(layout.record_path(1).exists());
    assert!(!layout.pictures_dir(1).exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn merged_session_combines_selected_tracks() {
    let dir = temp_session("surftrack_test_pipeline_merge");
    let image = RgbImage::new(VIDEO.width, VIDEO.height);
    let mut pipeline =
        SessionPipeline::new(ManeuverConfig::default(), PipelineOptions::new(&dir, VIDEO)).unwrap();
    for frame in synthetic_session(61) {
        pipeline.process_frame(&frame, Some(&image)).unwrap();
    }
    pipeline.finish().unwrap();

    let layout = SessionLayout::new(&dir);
    let results = SessionResults::collect(&dir).unwrap();
    let merged = merge_tracks(&results, &[8, 1]).unwrap();
    layout.write_merged(&merged).unwrap();

    let surfer = &merged.surfers[0];
    assert_eq!(surfer.id(), 1);
    assert_eq!(surfer.record.total_maneuvers, 2);
    assert_eq!(surfer.merged_from, Some(vec![1, 8]));
    assert_eq!(surfer.pictures.len(), 2);
    assert!(layout.merged_path().exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_config_is_rejected() {
    let dir = temp_session("surftrack_test_pipeline_invalid");
    let config = ManeuverConfig {
        sustain_window: 1,
        ..Default::default()
    };
    assert!(SessionPipeline::new(config, PipelineOptions::new(&dir, VIDEO)).is_err());
    std::fs::remove_dir_all(&dir).ok();
}

/// Sink that refuses every capture and remembers who asked.
struct FailingEvidence {
    attempts: Arc<Mutex<Vec<(TrackId, u64)>>>,
}

impl EvidenceSink for FailingEvidence {
    fn capture(
        &mut self,
        track_id: TrackId,
        frame: u64,
        _image: &RgbImage,
        _roi: &BoundingBox,
    ) -> SurftrackResult<Option<PathBuf>> {
        self.attempts.lock().unwrap().push((track_id, frame));
        Err(SurftrackError::evidence("disk full"))
    }
}

#[test]
fn evidence_failure_still_records_the_frame() {
    let dir = temp_session("surftrack_test_pipeline_evidence_failure");
    let attempts = Arc::new(Mutex::new(vec![]));
    let image = RgbImage::new(VIDEO.width, VIDEO.height);

    let mut pipeline = SessionPipeline::new(ManeuverConfig::default(), PipelineOptions::new(&dir, VIDEO))
        .unwrap()
        .with_evidence_sink(Box::new(FailingEvidence {
            attempts: Arc::clone(&attempts),
        }));

    let mut failed_frames = vec![];
    for frame in synthetic_session(61) {
        if pipeline.process_frame(&frame, Some(&image)).is_err() {
            failed_frames.push(frame.frame);
        }
    }
    // Both surfers turn on the same frame; each gets its own attempt.
    assert_eq!(failed_frames, vec![20]);
    assert_eq!(*attempts.lock().unwrap(), vec![(1, 20), (8, 20)]);

    let summary = pipeline.finish().unwrap();
    assert_eq!(summary.maneuvers_total, 2);

    let layout = SessionLayout::new(&dir);
    let content = std::fs::read_to_string(layout.tracking_log_path()).unwrap();
    let frames = parse_tracked_frames(&content).unwrap();
    assert_eq!(frames.len(), 61);
    let logged = frames.iter().find(|f| f.frame == 20).unwrap();
    let counts: Vec<u32> = logged.detections.iter().map(|d| d.maneuver_count).collect();
    assert_eq!(counts, vec![1, 0, 1]);

    std::fs::remove_dir_all(&dir).ok();
}
