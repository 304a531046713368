//! Face and mouth-motion detection.
//!
//! Per frame: find frontal faces with a Haar cascade, classify each by
//! frame side, and score "is this person talking" by differencing the
//! lower half of the face box (mouth/jaw region) against the previous
//! frame's patch for the same side. There is no face identity beyond
//! left/right — see [`crate::identity`].

use std::collections::HashMap;
use std::path::Path;

use opencv::{
    core::{self, Mat, Rect, Size, Vector},
    objdetect::CascadeClassifier,
    prelude::*,
};
use tracing::debug;

use reframe_models::{BoundingBox, Side, SpeakerDetection};

use crate::config::ReframeConfig;
use crate::error::{ReframeError, ReframeResult};
use crate::identity::{MidlineIdentity, SpeakerIdentity};

/// Environment override for the cascade model location.
const CASCADE_ENV: &str = "REFRAME_CASCADE_PATH";

/// Standard install locations for the frontal-face cascade, checked in order.
const CASCADE_PATHS: &[&str] = &[
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
    "./models/haarcascade_frontalface_default.xml",
];

/// Find the frontal-face cascade XML file.
fn find_cascade_path(config: &ReframeConfig) -> Option<String> {
    if let Some(path) = &config.cascade_path {
        if Path::new(path).exists() {
            return Some(path.clone());
        }
    }
    if let Ok(path) = std::env::var(CASCADE_ENV) {
        if Path::new(&path).exists() {
            return Some(path);
        }
    }
    CASCADE_PATHS
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| p.to_string())
}

/// Keep at most one detection per side.
///
/// When the cascade reports two faces on the same side (crowding or a
/// spurious double detection), the larger bounding box wins; on equal
/// areas the earlier detection in cascade output order is kept.
fn select_best_per_side(
    faces: &[BoundingBox],
    identity: &dyn SpeakerIdentity,
    frame_width: u32,
) -> Vec<(Side, BoundingBox)> {
    let mut best: HashMap<Side, BoundingBox> = HashMap::new();
    for bbox in faces {
        let side = identity.side_of(bbox, frame_width);
        match best.get(&side) {
            Some(existing) if existing.area() >= bbox.area() => {}
            _ => {
                best.insert(side, *bbox);
            }
        }
    }
    // Deterministic left-then-right ordering for downstream consumers
    let mut result = Vec::with_capacity(2);
    for side in [Side::Left, Side::Right] {
        if let Some(bbox) = best.remove(&side) {
            result.push((side, bbox));
        }
    }
    result
}

/// Frontal-face detector with per-side mouth-motion scoring.
pub struct FaceMotionDetector {
    cascade: CascadeClassifier,
    identity: Box<dyn SpeakerIdentity>,
    /// Previous frame's mouth patch per side, stored unconditionally after
    /// scoring so the next frame always compares against this one.
    prev_patches: HashMap<Side, Mat>,
    frame_width: u32,
    scale_factor: f64,
    min_neighbors: i32,
    min_face_size: i32,
    crowded_frames: usize,
}

impl FaceMotionDetector {
    /// Create a detector for frames of the given width.
    pub fn new(config: &ReframeConfig, frame_width: u32) -> ReframeResult<Self> {
        Self::with_identity(config, frame_width, Box::new(MidlineIdentity))
    }

    /// Create a detector with a custom identity scheme.
    pub fn with_identity(
        config: &ReframeConfig,
        frame_width: u32,
        identity: Box<dyn SpeakerIdentity>,
    ) -> ReframeResult<Self> {
        let cascade_path = find_cascade_path(config).ok_or_else(|| {
            ReframeError::detection_failed(format!(
                "Frontal-face cascade not found; set {} or install OpenCV haarcascades",
                CASCADE_ENV
            ))
        })?;

        let cascade = CascadeClassifier::new(&cascade_path).map_err(|e| {
            ReframeError::detection_failed(format!(
                "Failed to load cascade {}: {}",
                cascade_path, e
            ))
        })?;

        debug!("Loaded frontal-face cascade from {}", cascade_path);

        Ok(Self {
            cascade,
            identity,
            prev_patches: HashMap::new(),
            frame_width,
            scale_factor: config.cascade_scale_factor,
            min_neighbors: config.cascade_min_neighbors,
            min_face_size: config.min_face_size as i32,
            crowded_frames: 0,
        })
    }

    /// Frames so far where the cascade reported more than two faces.
    pub fn crowded_frames(&self) -> usize {
        self.crowded_frames
    }

    /// Detect speakers in a grayscale frame.
    ///
    /// Returns at most one detection per side. Mouth patches are updated
    /// for every surviving detection, even when the motion score is zero.
    pub fn detect(&mut self, gray: &Mat) -> ReframeResult<Vec<SpeakerDetection>> {
        let mut faces = Vector::<Rect>::new();
        self.cascade
            .detect_multi_scale(
                gray,
                &mut faces,
                self.scale_factor,
                self.min_neighbors,
                0,
                Size::new(self.min_face_size, self.min_face_size),
                Size::default(),
            )
            .map_err(|e| ReframeError::detection_failed(format!("Cascade detection: {}", e)))?;

        if faces.len() > 2 {
            self.crowded_frames += 1;
            debug!(
                faces = faces.len(),
                "More than two faces detected; keeping the largest per side"
            );
        }

        let boxes: Vec<BoundingBox> = faces
            .iter()
            .map(|r| BoundingBox::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64))
            .collect();

        let survivors = select_best_per_side(&boxes, self.identity.as_ref(), self.frame_width);

        let mut detections = Vec::with_capacity(survivors.len());
        for (side, bbox) in survivors {
            let motion_score = self.score_mouth_motion(gray, side, &bbox)?;
            detections.push(SpeakerDetection::new(side, bbox.cx(), motion_score, bbox));
        }

        Ok(detections)
    }

    /// Sum of absolute pixel differences in the mouth region vs. the
    /// previous same-side patch. Zero when no previous patch exists or the
    /// face size changed; the current patch replaces the stored one either
    /// way.
    fn score_mouth_motion(
        &mut self,
        gray: &Mat,
        side: Side,
        bbox: &BoundingBox,
    ) -> ReframeResult<f64> {
        let x = bbox.x as i32;
        let y = bbox.y as i32;
        let w = bbox.width as i32;
        let h = bbox.height as i32;

        // Lower half of the face box: mouth and jaw
        let mouth_rect = Rect::new(x, y + h / 2, w, h - h / 2);
        let patch = Mat::roi(gray, mouth_rect)
            .map_err(|e| ReframeError::detection_failed(format!("Mouth ROI: {}", e)))?
            .try_clone()
            .map_err(|e| ReframeError::detection_failed(format!("Mouth patch clone: {}", e)))?;

        let score = match self.prev_patches.get(&side) {
            Some(prev) if prev.rows() == patch.rows() && prev.cols() == patch.cols() => {
                let mut diff = Mat::default();
                core::absdiff(prev, &patch, &mut diff)
                    .map_err(|e| ReframeError::detection_failed(format!("Mouth absdiff: {}", e)))?;
                let sum = core::sum_elems(&diff)
                    .map_err(|e| ReframeError::detection_failed(format!("Mouth sum: {}", e)))?;
                sum[0]
            }
            _ => 0.0,
        };

        self.prev_patches.insert(side, patch);
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_best_per_side_larger_wins() {
        let identity = MidlineIdentity;
        let small = BoundingBox::new(100.0, 100.0, 60.0, 60.0);
        let large = BoundingBox::new(300.0, 100.0, 120.0, 120.0);

        let survivors = select_best_per_side(&[small, large], &identity, 1920);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].0, Side::Left);
        assert_eq!(survivors[0].1, large);
    }

    #[test]
    fn test_select_best_per_side_tie_keeps_first() {
        let identity = MidlineIdentity;
        let first = BoundingBox::new(100.0, 100.0, 80.0, 80.0);
        let second = BoundingBox::new(400.0, 200.0, 80.0, 80.0);

        let survivors = select_best_per_side(&[first, second], &identity, 1920);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].1, first);
    }

    #[test]
    fn test_select_best_per_side_one_per_half() {
        let identity = MidlineIdentity;
        let left = BoundingBox::new(200.0, 100.0, 100.0, 100.0);
        let right = BoundingBox::new(1400.0, 100.0, 100.0, 100.0);

        let survivors = select_best_per_side(&[right, left], &identity, 1920);
        assert_eq!(survivors.len(), 2);
        // Left first regardless of detection order
        assert_eq!(survivors[0].0, Side::Left);
        assert_eq!(survivors[1].0, Side::Right);
    }

    #[test]
    fn test_select_best_per_side_empty() {
        let identity = MidlineIdentity;
        assert!(select_best_per_side(&[], &identity, 1920).is_empty());
    }
}
