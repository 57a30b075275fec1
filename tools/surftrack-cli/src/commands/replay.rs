//! Redraw a session's overlays for selected tracks only.

use std::path::PathBuf;

use surftrack_model::session::SessionLayout;
use surftrack_render::{replay_session, ImageDirSink, ImageDirSource, OverlayRenderer, ReplayPlan};

pub fn run(
    path: PathBuf,
    ids: Vec<u64>,
    frames: PathBuf,
    output: PathBuf,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Replaying session at: {}", path.display());
    println!("  Tracks: {ids:?}");

    let layout = SessionLayout::new(&path);
    let plan = ReplayPlan::from_tracking_log(layout.tracking_log_path(), ids)?;

    let mut renderer = OverlayRenderer::default();
    match font {
        Some(font) => renderer = renderer.with_font_file(font)?,
        None => println!("  No font given, labels are drawn without text"),
    }

    let mut source = ImageDirSource::open(&frames)?;
    let mut sink = ImageDirSink::create(&output)?;
    let stats = replay_session(&plan, &mut source, &mut sink, &renderer)?;

    println!("  Rendered {} frames", stats.frames_rendered);
    println!("  Drew {} overlays", stats.detections_drawn);
    println!("  Output: {}", output.display());

    Ok(())
}
