#![deny(unreachable_patterns)]
//! Speaker-tracking landscape-to-portrait reframing engine.
//!
//! This crate provides:
//! - ffprobe-based input inspection
//! - Haar-cascade face detection with mouth-motion scoring
//! - Hysteresis-based active-speaker tracking
//! - Cut-style shot stabilization of the crop trajectory
//! - Two-pass rendering (OpenCV) and ffmpeg audio muxing

pub mod config;
pub mod detector;
pub mod error;
pub mod identity;
pub mod mux;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod renderer;
pub mod stabilizer;
pub mod tracker;

pub use config::ReframeConfig;
pub use detector::FaceMotionDetector;
pub use error::{ReframeError, ReframeResult};
pub use identity::{MidlineIdentity, SpeakerIdentity};
pub use mux::mux_audio;
pub use pipeline::{default_output_path, PortraitReframer};
pub use planner::CropPlanner;
pub use probe::{probe_video, VideoInfo};
pub use renderer::render_cropped;
pub use stabilizer::stabilize_shots;
pub use tracker::{SpeakerTracker, TrackerState};
