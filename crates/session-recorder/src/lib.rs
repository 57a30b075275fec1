//! SurfTrack Session Recorder
//!
//! The I/O half of a processing session. Drives the maneuver engine frame
//! by frame and persists what it produces:
//!
//! - **Evidence:** one PNG per accepted maneuver under `elements/<id>/pictures/`
//! - **Tracking log:** append-only JSONL of every consumed detection
//! - **Export:** `elements/<id>/maneuvers.json` for tracks with maneuvers;
//!   every artifact of a track without any is removed
//! - **Summary:** aggregate counts in `summary.json`

pub mod evidence;
pub mod exporter;
pub mod pipeline;
pub mod tracking_log;

pub use evidence::{EvidenceSink, NullEvidence, PngEvidenceStore};
pub use exporter::{ExportReport, TrackExporter};
pub use pipeline::{PipelineOptions, SessionPipeline};
pub use tracking_log::TrackingLogWriter;
