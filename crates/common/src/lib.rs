//! SurfTrack Common Utilities
//!
//! Shared infrastructure for all SurfTrack crates:
//! - Error types and result aliases
//! - Session clocks used to timestamp processed frames
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
