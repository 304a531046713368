//! Configuration for the reframing pipeline.
//!
//! All knobs are consumed once at construction; defaults match the values
//! the engine was tuned with on 1080p two-person podcast footage.

use serde::{Deserialize, Serialize};

/// Configuration for the reframing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeConfig {
    // === Face Detection ===
    /// Minimum detectable face size in pixels (default: 50)
    pub min_face_size: u32,

    /// Cascade pyramid scale factor (default: 1.1)
    pub cascade_scale_factor: f64,

    /// Cascade neighbor votes required per detection (default: 5)
    pub cascade_min_neighbors: i32,

    /// Explicit path to the frontal-face cascade XML. When unset the
    /// detector checks `REFRAME_CASCADE_PATH` and then standard OpenCV
    /// install locations.
    pub cascade_path: Option<String>,

    // === Speaker Switching ===
    /// Minimum frames between speaker switches (default: 210, ~7s at 30fps)
    pub min_frames_before_switch: u32,

    /// The challenger's motion must exceed the current speaker's by this
    /// multiplier to trigger a switch (default: 3.0)
    pub switch_threshold: f64,

    /// Absolute motion floor below which no switch ever happens
    /// (default: 500.0)
    pub movement_floor: f64,

    // === Shot Stabilization ===
    /// Crop-x delta between consecutive frames treated as a cut
    /// (default: 100 px)
    pub cut_threshold: i32,

    // === Output ===
    /// Output width in pixels (default: 1080)
    pub output_width: i32,

    /// Output height in pixels (default: 1920)
    pub output_height: i32,

    /// Output frame rate override; source rate when unset
    pub output_fps: Option<f64>,

    // === Encoding (mux step) ===
    /// FFmpeg x264 preset (default: "fast")
    pub render_preset: String,

    /// FFmpeg CRF quality (default: 18)
    pub render_crf: u32,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            min_face_size: 50,
            cascade_scale_factor: 1.1,
            cascade_min_neighbors: 5,
            cascade_path: None,

            min_frames_before_switch: 210,
            switch_threshold: 3.0,
            movement_floor: 500.0,

            cut_threshold: 100,

            output_width: 1080,
            output_height: 1920,
            output_fps: None,

            render_preset: "fast".to_string(),
            render_crf: 18,
        }
    }
}

impl ReframeConfig {
    /// Fast configuration for quick previews.
    pub fn fast() -> Self {
        Self {
            render_preset: "ultrafast".to_string(),
            render_crf: 23,
            ..Default::default()
        }
    }

    /// Quality configuration for final output.
    pub fn quality() -> Self {
        Self {
            render_preset: "slow".to_string(),
            render_crf: 17,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = ReframeConfig::default();
        assert_eq!(config.min_face_size, 50);
        assert_eq!(config.min_frames_before_switch, 210);
        assert_eq!(config.switch_threshold, 3.0);
        assert_eq!(config.movement_floor, 500.0);
        assert_eq!(config.cut_threshold, 100);
        assert_eq!((config.output_width, config.output_height), (1080, 1920));
        assert!(config.output_fps.is_none());
    }

    #[test]
    fn test_preset_constructors() {
        assert_eq!(ReframeConfig::fast().render_preset, "ultrafast");
        assert_eq!(ReframeConfig::quality().render_crf, 17);
        // Tracking knobs are unaffected by encode presets
        assert_eq!(ReframeConfig::quality().min_frames_before_switch, 210);
    }
}
