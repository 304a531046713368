//! Error types for the reframing engine.
//!
//! The taxonomy keeps input, render and mux failures distinct so a caller
//! can tell "nothing was produced" (input/render) from "reframing worked
//! but final packaging failed" (mux).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for reframing operations.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Errors that can occur while reframing a video.
#[derive(Debug, Error)]
pub enum ReframeError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Cannot open or decode input: {0}")]
    InputFailed(String),

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Face detection setup failed: {0}")]
    DetectionFailed(String),

    #[error("Render pass failed: {0}")]
    RenderFailed(String),

    #[error("Audio mux failed: {message}")]
    MuxFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ReframeError {
    /// Create an input failure error.
    pub fn input_failed(message: impl Into<String>) -> Self {
        Self::InputFailed(message.into())
    }

    /// Create a detection setup failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a render failure error.
    pub fn render_failed(message: impl Into<String>) -> Self {
        Self::RenderFailed(message.into())
    }

    /// Create a mux failure error.
    pub fn mux_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::MuxFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}
