//! One processing session: frames in, session directory out.

use std::path::PathBuf;

use image::RgbImage;
use surftrack_common::clock::TimeSource;
use surftrack_common::config::{AppConfig, TimeSourceKind};
use surftrack_common::error::SurftrackResult;
use surftrack_core::{FrameContext, FrameOutcome, ManeuverConfig, ManeuverEngine, TrackUpdate};
use surftrack_model::detection::{FrameDetections, TrackedDetection, TrackedFrame, VideoInfo};
use surftrack_model::session::{SessionLayout, SessionSummary};

use crate::evidence::{EvidenceSink, NullEvidence, PngEvidenceStore};
use crate::exporter::TrackExporter;
use crate::tracking_log::TrackingLogWriter;

/// Session-level settings that are not maneuver thresholds.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub video: VideoInfo,
    pub time_source: TimeSourceKind,
    pub fallback_fps: f64,
    pub capture_evidence: bool,
    pub write_tracking_log: bool,
}

impl PipelineOptions {
    pub fn new(output_dir: impl Into<PathBuf>, video: VideoInfo) -> Self {
        Self {
            output_dir: output_dir.into(),
            video,
            time_source: TimeSourceKind::Video,
            fallback_fps: 30.0,
            capture_evidence: true,
            write_tracking_log: true,
        }
    }

    /// Options seeded from the application config.
    pub fn from_app_config(config: &AppConfig, output_dir: impl Into<PathBuf>, video: VideoInfo) -> Self {
        Self {
            time_source: config.processing.time_source,
            fallback_fps: config.processing.fallback_fps,
            capture_evidence: config.processing.capture_evidence,
            ..Self::new(output_dir, video)
        }
    }
}

pub struct SessionPipeline {
    engine: ManeuverEngine,
    layout: SessionLayout,
    clock: TimeSource,
    video: VideoInfo,
    tracking_log: Option<TrackingLogWriter>,
    evidence: Box<dyn EvidenceSink>,
}

impl SessionPipeline {
    /// Validate the configuration, create the output directory and open the
    /// tracking log.
    pub fn new(config: ManeuverConfig, options: PipelineOptions) -> SurftrackResult<Self> {
        config.validate()?;

        let layout = SessionLayout::new(&options.output_dir);
        std::fs::create_dir_all(layout.root())?;

        let tracking_log = if options.write_tracking_log {
            Some(TrackingLogWriter::create(layout.tracking_log_path(), &options.video)?)
        } else {
            None
        };

        let evidence: Box<dyn EvidenceSink> = if options.capture_evidence {
            Box::new(PngEvidenceStore::new(layout.clone()))
        } else {
            Box::new(NullEvidence)
        };

        let clock = TimeSource::from_kind(options.time_source, options.video.fps, options.fallback_fps);

        tracing::info!(
            output = %layout.root().display(),
            fps = options.video.fps,
            width = options.video.width,
            height = options.video.height,
            "Session started"
        );

        Ok(Self {
            engine: ManeuverEngine::new(config),
            layout,
            clock,
            video: options.video,
            tracking_log,
            evidence,
        })
    }

    /// Replace the evidence sink.
    pub fn with_evidence_sink(mut self, sink: Box<dyn EvidenceSink>) -> Self {
        self.evidence = sink;
        self
    }

    pub fn engine(&self) -> &ManeuverEngine {
        &self.engine
    }

    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    /// Run one frame through the engine, append the frame to the tracking
    /// log, then persist evidence for accepted maneuvers.
    ///
    /// `image` is the decoded frame; without it no evidence is captured.
    /// Every maneuver of the frame gets a capture attempt; the first failure
    /// is returned afterwards, once the frame is fully recorded.
    pub fn process_frame(
        &mut self,
        frame: &FrameDetections,
        image: Option<&RgbImage>,
    ) -> SurftrackResult<Vec<TrackUpdate>> {
        let ctx = FrameContext {
            frame: frame.frame,
            timestamp_secs: self.clock.timestamp_secs(frame.frame),
            width: self.video.width,
            height: self.video.height,
        };
        let updates = self.engine.process_frame(&frame.detections, &ctx);

        self.log_frame(frame.frame, &updates)?;

        let mut first_error = None;
        if let Some(image) = image {
            for update in &updates {
                let FrameOutcome::Maneuver(event) = &update.outcome else {
                    continue;
                };
                if let Err(e) = self.evidence.capture(update.track_id, event.frame, image, &update.bbox) {
                    tracing::warn!(
                        track_id = update.track_id,
                        frame = event.frame,
                        "Evidence capture failed: {e}"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(updates),
        }
    }

    fn log_frame(&mut self, frame: u64, updates: &[TrackUpdate]) -> SurftrackResult<()> {
        if let Some(log) = self.tracking_log.as_mut() {
            log.write_frame(&TrackedFrame {
                frame,
                detections: updates
                    .iter()
                    .map(|u| TrackedDetection {
                        track_id: u.track_id,
                        bbox: u.bbox,
                        maneuver_count: u.maneuver_count,
                        pose_landmarks: u.pose_landmarks.clone(),
                    })
                    .collect(),
            })?;
        }
        Ok(())
    }

    /// Finalize every track, export or discard it, and write the summary.
    pub fn finish(mut self) -> SurftrackResult<SessionSummary> {
        if let Some(log) = self.tracking_log.as_mut() {
            log.flush()?;
        }

        let frames_processed = self.engine.frames_processed();
        let finalized = self.engine.finalize();
        let report = TrackExporter::new(self.layout.clone()).export(finalized)?;

        let summary = SessionSummary {
            frames_processed,
            tracks_total: report.tracks_total(),
            tracks_exported: report.exported.len(),
            tracks_discarded: report.discarded.len(),
            maneuvers_total: report.maneuvers_total,
        };
        self.layout.write_summary(&summary).map_err(anyhow::Error::from)?;

        tracing::info!(
            frames = summary.frames_processed,
            tracks = summary.tracks_total,
            with_maneuvers = summary.tracks_exported,
            discarded = summary.tracks_discarded,
            maneuvers = summary.maneuvers_total,
            "Session finished"
        );
        Ok(summary)
    }
}
