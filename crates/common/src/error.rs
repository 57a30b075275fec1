//! Error types shared across SurfTrack crates.

use std::path::PathBuf;

/// Top-level error type for SurfTrack operations.
#[derive(Debug, thiserror::Error)]
pub enum SurftrackError {
    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Evidence capture error: {message}")]
    Evidence { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SurftrackError.
pub type SurftrackResult<T> = Result<T, SurftrackError>;

impl SurftrackError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn evidence(msg: impl Into<String>) -> Self {
        Self::Evidence {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
