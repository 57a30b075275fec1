//! Run maneuver detection over a detection log.

use std::path::PathBuf;

use surftrack_common::config::AppConfig;
use surftrack_core::ManeuverConfig;
use surftrack_model::detection::{parse_frames, parse_header, VideoInfo};
use surftrack_recorder::{PipelineOptions, SessionPipeline};
use surftrack_render::{FrameSource, ImageDirSource};

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    frames: Option<PathBuf>,
    fps: Option<f64>,
    thresholds: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Analyzing detections in: {}", input.display());

    let app = AppConfig::load();

    let content = std::fs::read_to_string(&input)
        .map_err(|_| anyhow::anyhow!("Detection log not found: {}", input.display()))?;
    let header = parse_header(&content).map_err(|e| anyhow::anyhow!("Invalid log header: {e}"))?;
    let detections =
        parse_frames(&content).map_err(|e| anyhow::anyhow!("Failed to parse detections: {e}"))?;
    println!("  Loaded {} frames", detections.len());

    let mut source = frames.as_ref().map(ImageDirSource::open).transpose()?;

    let mut video = match header {
        Some(info) => info,
        None => {
            // Without a header, size comes from the first frame image if any.
            let (width, height) = match source.as_mut() {
                Some(s) => s.read_frame(0)?.map(|img| img.dimensions()).unwrap_or((0, 0)),
                None => (0, 0),
            };
            VideoInfo {
                fps: app.processing.fallback_fps,
                width,
                height,
                rotation: 0,
            }
        }
    };
    if let Some(fps) = fps {
        video.fps = fps;
    }
    println!(
        "  Video: {}x{} @ {}fps",
        video.width, video.height, video.fps
    );

    let config = match thresholds {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|_| anyhow::anyhow!("Thresholds file not found: {}", path.display()))?;
            ManeuverConfig::from_json(&json)?
        }
        None => ManeuverConfig::default(),
    };

    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string());
        app.output_dir.join(stem)
    });

    let mut options = PipelineOptions::from_app_config(&app, &output, video);
    options.capture_evidence &= source.is_some();
    let mut pipeline = SessionPipeline::new(config, options)?;

    let mut maneuvers = 0usize;
    for frame in &detections {
        let image = match source.as_mut() {
            Some(s) => s.read_frame(frame.frame)?,
            None => None,
        };
        let updates = pipeline.process_frame(frame, image.as_ref())?;
        for event in updates.iter().filter_map(|u| u.outcome.maneuver()) {
            maneuvers += 1;
            tracing::debug!(frame = event.frame, maneuver = %event.maneuver_type, "Maneuver");
        }
    }
    println!("  Detected {maneuvers} maneuvers");

    let summary = pipeline.finish()?;

    println!();
    println!("Session: {}", output.display());
    println!("  Frames processed: {}", summary.frames_processed);
    println!("  Tracks: {}", summary.tracks_total);
    println!("  Tracks with maneuvers: {}", summary.tracks_exported);
    println!("  Tracks discarded: {}", summary.tracks_discarded);
    println!("  Maneuvers: {}", summary.maneuvers_total);
    println!("\nAnalysis complete.");

    Ok(())
}
