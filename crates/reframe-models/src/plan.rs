//! Crop plan produced by pass 1 and consumed by the renderer.

/// Ordered per-frame crop-x offsets, one entry per source frame.
///
/// Invariant: every value lies in `[0, frame_width - crop_width]`. The
/// planner enforces this at construction and the stabilizer only ever
/// replaces values with medians of existing values, which preserves it.
pub type CropPlan = Vec<i32>;
