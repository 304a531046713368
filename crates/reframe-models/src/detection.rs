//! Per-frame speaker detections.
//!
//! Detections carry no persistent identity: a face is "left" or "right"
//! purely by where its center falls relative to the frame midline, and the
//! classification is redone every frame.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Which half of the frame a detection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Center-x left of the frame midline
    Left,
    /// Center-x at or right of the frame midline
    Right,
}

impl Side {
    /// Classify a horizontal position against the frame midline.
    pub fn of(center_x: f64, frame_width: u32) -> Side {
        if center_x < frame_width as f64 / 2.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// The other side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// One candidate speaker in a single frame.
///
/// Created fresh each frame by the detector; never persisted across frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeakerDetection {
    /// Side of the frame the face was found on
    pub side: Side,
    /// Horizontal center of the face box
    pub center_x: f64,
    /// Sum of absolute mouth-region pixel differences vs. the previous frame.
    /// Zero when no comparable previous patch exists.
    pub motion_score: f64,
    /// Full face bounding box
    pub bbox: BoundingBox,
}

impl SpeakerDetection {
    /// Create a new detection.
    pub fn new(side: Side, center_x: f64, motion_score: f64, bbox: BoundingBox) -> Self {
        Self {
            side,
            center_x,
            motion_score,
            bbox,
        }
    }
}
