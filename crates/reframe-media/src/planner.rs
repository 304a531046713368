//! Crop window planning.
//!
//! Projects per-frame target positions into bounded crop-x offsets for a
//! fixed-width 9:16 crop. Crop height is the full frame height, so only
//! horizontal placement varies.

use reframe_models::CropPlan;

/// Portrait aspect ratio (width / height).
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Deterministic per-frame projection from target position to crop offset.
#[derive(Debug, Clone, Copy)]
pub struct CropPlanner {
    frame_width: i32,
    crop_width: i32,
}

impl CropPlanner {
    /// Create a planner for the given source frame dimensions.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        let crop_width = (frame_height as f64 * PORTRAIT_RATIO).round() as i32;
        Self {
            frame_width: frame_width as i32,
            crop_width: crop_width.min(frame_width as i32),
        }
    }

    /// The fixed crop width for this source.
    pub fn crop_width(&self) -> i32 {
        self.crop_width
    }

    /// Crop-x offset centered on `target_x`, clamped to the frame.
    pub fn plan(&self, target_x: f64) -> i32 {
        let crop_x = (target_x - self.crop_width as f64 / 2.0) as i32;
        crop_x.clamp(0, self.frame_width - self.crop_width)
    }

    /// Plan a whole sequence of targets.
    pub fn plan_all(&self, targets: &[f64]) -> CropPlan {
        targets.iter().map(|&t| self.plan(t)).collect()
    }
}
