//! Show session results.

use std::path::PathBuf;

use surftrack_model::session::{SessionLayout, SessionResults};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let layout = SessionLayout::new(&path);
    let results = SessionResults::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load results: {e}"))?;

    println!("Session: {}", path.display());
    if let Some(summary) = layout
        .read_summary()
        .map_err(|e| anyhow::anyhow!("Failed to read summary: {e}"))?
    {
        println!("  Frames processed: {}", summary.frames_processed);
        println!(
            "  Tracks: {} ({} with maneuvers, {} discarded)",
            summary.tracks_total, summary.tracks_exported, summary.tracks_discarded
        );
    }
    match results.original_surfer_count {
        Some(original) if results.merged => {
            println!("  Merged: yes ({original} surfers before merge)")
        }
        _ => println!("  Merged: {}", if results.merged { "yes" } else { "no" }),
    }
    println!();

    println!("Surfers:");
    if results.surfers.is_empty() {
        println!("  (none)");
    }
    for surfer in &results.surfers {
        println!(
            "  #{}: {} maneuvers, {} pictures",
            surfer.id(),
            surfer.record.total_maneuvers,
            surfer.pictures.len()
        );
        if let Some(from) = &surfer.merged_from {
            println!("    merged from {from:?}");
        }
        for event in &surfer.record.events {
            println!(
                "    frame {:>6}  {:>7.2}s  {:<11} {:>5.1}° {:<5} {:>6.1}°/s",
                event.frame,
                event.timestamp,
                event.maneuver_type.as_str(),
                event.metrics.angle_deg,
                event.metrics.direction.as_str(),
                event.metrics.angular_speed_deg_s
            );
        }
    }
    println!();
    println!("Total maneuvers: {}", results.total_maneuvers());

    Ok(())
}
