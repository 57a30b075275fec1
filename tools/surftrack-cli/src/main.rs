//! SurfTrack CLI: maneuver detection over recorded detection logs.
//!
//! Usage:
//!   surftrack analyze <LOG>          Detect maneuvers in a detection log
//!   surftrack replay <DIR>           Redraw overlays for selected tracks
//!   surftrack merge <DIR> <IDS>...   Merge track identities
//!   surftrack info <DIR>             Show session results
//!   surftrack thresholds             Print the default thresholds

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "surftrack",
    about = "Per-frame surfing maneuver detection",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run maneuver detection over a detection log
    Analyze {
        /// Detection log (JSONL, optional `#` header with video info)
        input: PathBuf,

        /// Session output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory of decoded frames (frame_000000.png, ...) for evidence capture
        #[arg(long)]
        frames: Option<PathBuf>,

        /// Frame rate override
        #[arg(long)]
        fps: Option<f64>,

        /// Threshold overrides (JSON)
        #[arg(long)]
        thresholds: Option<PathBuf>,
    },

    /// Redraw overlays for an allow-list of tracks
    Replay {
        /// Session directory containing tracking_data.jsonl
        path: PathBuf,

        /// Track ids to draw
        #[arg(long, required = true, num_args = 1..)]
        ids: Vec<u64>,

        /// Directory of decoded source frames
        #[arg(long)]
        frames: PathBuf,

        /// Directory for rendered frames
        #[arg(short, long)]
        output: PathBuf,

        /// TrueType font for label text
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Merge several track ids into one surfer
    Merge {
        /// Session directory
        path: PathBuf,

        /// Track ids to merge
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Show session results
    Info {
        /// Session directory
        path: PathBuf,
    },

    /// Print the default maneuver thresholds as JSON
    Thresholds,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    surftrack_common::logging::init_logging(&surftrack_common::logging::cli_logging(cli.verbose));

    match cli.command {
        Commands::Analyze {
            input,
            output,
            frames,
            fps,
            thresholds,
        } => commands::analyze::run(input, output, frames, fps, thresholds),
        Commands::Replay {
            path,
            ids,
            frames,
            output,
            font,
        } => commands::replay::run(path, ids, frames, output, font),
        Commands::Merge { path, ids } => commands::merge::run(path, ids),
        Commands::Info { path } => commands::info::run(path),
        Commands::Thresholds => commands::thresholds::run(),
    }
}
