//! Merge several track ids of one surfer into a single result.

use std::path::PathBuf;

use surftrack_model::merge::merge_tracks;
use surftrack_model::session::{SessionLayout, SessionResults};

pub fn run(path: PathBuf, ids: Vec<u64>) -> anyhow::Result<()> {
    println!("Merging tracks {ids:?} in: {}", path.display());

    let results = SessionResults::collect(&path)
        .map_err(|e| anyhow::anyhow!("Failed to collect results: {e}"))?;
    let merged = merge_tracks(&results, &ids).map_err(|e| anyhow::anyhow!("Cannot merge: {e}"))?;

    let layout = SessionLayout::new(&path);
    layout
        .write_merged(&merged)
        .map_err(|e| anyhow::anyhow!("Failed to write merged results: {e}"))?;

    let deleted = layout.delete_unselected(&ids, &results.ids());
    if !deleted.is_empty() {
        println!("  Removed unselected tracks: {deleted:?}");
    }

    if let Some(surfer) = merged.surfers.first() {
        println!("  Merged surfer id: {}", surfer.id());
        println!("  Maneuvers: {}", surfer.record.total_maneuvers);
        println!("  Pictures: {}", surfer.pictures.len());
    }
    println!("  Saved to: {}", layout.merged_path().display());

    Ok(())
}
