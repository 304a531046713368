//! Speaker tracking state machine.
//!
//! Decides, once per frame, which horizontal position the virtual camera
//! should focus on. The policy is cut-based: the target jumps between the
//! two speakers' positions, gated by hysteresis so brief noise never
//! causes rapid oscillation. There is no smoothing here by design.

use reframe_models::{Side, SpeakerDetection};

use crate::config::ReframeConfig;

/// Mutable tracking state carried across frames of a single video.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerState {
    /// Current focus position; unset until the first detection.
    pub current_target_x: Option<f64>,
    /// Frames elapsed since the last switch (or since initialization).
    pub frames_since_switch: u32,
}

impl TrackerState {
    /// Fresh state for a new video.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Hysteresis-gated speaker tracker.
///
/// `step` is a pure function from (state, detections) to (state, target),
/// so the switching policy is testable without a video pipeline.
#[derive(Debug, Clone)]
pub struct SpeakerTracker {
    frame_width: u32,
    min_frames_before_switch: u32,
    switch_threshold: f64,
    movement_floor: f64,
}

impl SpeakerTracker {
    /// Create a tracker for frames of the given width.
    pub fn new(config: &ReframeConfig, frame_width: u32) -> Self {
        Self {
            frame_width,
            min_frames_before_switch: config.min_frames_before_switch,
            switch_threshold: config.switch_threshold,
            movement_floor: config.movement_floor,
        }
    }

    /// Advance one frame and emit the target focus position.
    ///
    /// Detections are expected to hold at most one entry per side (the
    /// detector guarantees this); extra same-side entries are ignored
    /// beyond the first.
    pub fn step(
        &self,
        mut state: TrackerState,
        detections: &[SpeakerDetection],
    ) -> (TrackerState, f64) {
        state.frames_since_switch += 1;

        let left = detections.iter().find(|d| d.side == Side::Left);
        let right = detections.iter().find(|d| d.side == Side::Right);
        let midpoint = self.frame_width as f64 / 2.0;

        match (left, right) {
            // Nobody detected: hold the current target (midpoint if never set)
            (None, None) => {
                let target = state.current_target_x.unwrap_or(midpoint);
                (state, target)
            }

            // Single speaker always wins focus; not a switch for hysteresis
            (Some(only), None) | (None, Some(only)) => {
                state.current_target_x = Some(only.center_x);
                (state, only.center_x)
            }

            (Some(left), Some(right)) => {
                let Some(target) = state.current_target_x else {
                    // First sight of both: start on whoever is moving more
                    let speaker = if left.motion_score >= right.motion_score {
                        left
                    } else {
                        right
                    };
                    state.current_target_x = Some(speaker.center_x);
                    state.frames_since_switch = 0;
                    return (state, speaker.center_x);
                };

                let current_side = Side::of(target, self.frame_width);
                let (current, other) = match current_side {
                    Side::Left => (left, right),
                    Side::Right => (right, left),
                };

                let should_switch = state.frames_since_switch > self.min_frames_before_switch
                    && other.motion_score > current.motion_score * self.switch_threshold
                    && other.motion_score > self.movement_floor;

                if should_switch {
                    state.current_target_x = Some(other.center_x);
                    state.frames_since_switch = 0;
                }

                let target = state.current_target_x.unwrap_or(midpoint);
                (state, target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::BoundingBox;

    const WIDTH: u32 = 1920;

    fn det(side: Side, center_x: f64, motion: f64) -> SpeakerDetection {
        let bbox = BoundingBox::new(center_x - 50.0, 300.0, 100.0, 100.0);
        SpeakerDetection::new(side, center_x, motion, bbox)
    }

    fn tracker(min_frames: u32) -> SpeakerTracker {
        let config = ReframeConfig {
            min_frames_before_switch: min_frames,
            switch_threshold: 3.0,
            movement_floor: 500.0,
            ..Default::default()
        };
        SpeakerTracker::new(&config, WIDTH)
    }

    #[test]
    fn test_no_detections_emits_midpoint_before_first_target() {
        let tracker = tracker(10);
        let (state, target) = tracker.step(TrackerState::new(), &[]);
        assert_eq!(target, 960.0);
        assert!(state.current_target_x.is_none());
    }

    #[test]
    fn test_no_detections_holds_previous_target() {
        let tracker = tracker(10);
        let state = TrackerState {
            current_target_x: Some(400.0),
            frames_since_switch: 5,
        };
        let (state, target) = tracker.step(state, &[]);
        assert_eq!(target, 400.0);
        assert_eq!(state.frames_since_switch, 6);
    }

    #[test]
    fn test_single_detection_wins_regardless_of_hysteresis() {
        let tracker = tracker(10);
        let state = TrackerState {
            current_target_x: Some(1500.0),
            frames_since_switch: 0, // switch just happened
        };
        // Single face with zero motion still grabs focus immediately
        let (state, target) = tracker.step(state, &[det(Side::Left, 420.0, 0.0)]);
        assert_eq!(target, 420.0);
        // Not a switch: the counter keeps running
        assert_eq!(state.frames_since_switch, 1);
    }

    #[test]
    fn test_two_faces_initialize_to_larger_mover() {
        let tracker = tracker(10);
        let dets = [det(Side::Left, 400.0, 50.0), det(Side::Right, 1500.0, 800.0)];
        let (state, target) = tracker.step(TrackerState::new(), &dets);
        assert_eq!(target, 1500.0);
        assert_eq!(state.frames_since_switch, 0);
    }

    #[test]
    fn test_switch_requires_all_three_conditions() {
        let tracker = tracker(10);
        let mut state = TrackerState {
            current_target_x: Some(400.0),
            frames_since_switch: 100, // hysteresis floor passed
        };

        // Ratio passes but absolute floor fails: 450 > 100*3 but 450 < 500
        let dets = [det(Side::Left, 400.0, 100.0), det(Side::Right, 1500.0, 450.0)];
        let (next, target) = tracker.step(state, &dets);
        assert_eq!(target, 400.0);
        state = next;

        // Absolute floor passes but ratio fails: 600 < 250*3
        let dets = [det(Side::Left, 400.0, 250.0), det(Side::Right, 1500.0, 600.0)];
        let (next, target) = tracker.step(state, &dets);
        assert_eq!(target, 400.0);
        state = next;

        // All three pass
        let dets = [det(Side::Left, 400.0, 100.0), det(Side::Right, 1500.0, 600.0)];
        let (next, target) = tracker.step(state, &dets);
        assert_eq!(target, 1500.0);
        assert_eq!(next.frames_since_switch, 0);
    }

    #[test]
    fn test_scenario_a_single_face_linear_drift() {
        // 300 frames, single face drifting 400 -> 420: target tracks exactly
        let tracker = tracker(10);
        let mut state = TrackerState::new();
        for i in 0..300 {
            let cx = 400.0 + 20.0 * (i as f64) / 299.0;
            let (next, target) = tracker.step(state, &[det(Side::Left, cx, 30.0)]);
            assert_eq!(target, cx);
            state = next;
        }
    }

    #[test]
    fn test_scenario_b_alternating_motion_switch_timing() {
        // Left: constant 50. Right: alternates 0/600 (600 on odd frames).
        // min_frames_before_switch=10: no switch through frame 10 even
        // though 600 > 50*3; first switch at frame 11 (first odd frame
        // with counter > 10).
        let tracker = tracker(10);
        let mut state = TrackerState::new();
        let mut switch_frame = None;

        for frame in 0..40u32 {
            let right_motion = if frame % 2 == 1 { 600.0 } else { 0.0 };
            let dets = [
                det(Side::Left, 400.0, 50.0),
                det(Side::Right, 1500.0, right_motion),
            ];
            let was_left = state
                .current_target_x
                .map(|t| Side::of(t, WIDTH) == Side::Left)
                .unwrap_or(false);
            let (next, target) = tracker.step(state, &dets);
            if frame == 0 {
                // Right shows 0 motion on frame 0, so tracking starts left
                assert_eq!(target, 400.0);
            }
            if was_left && target == 1500.0 && switch_frame.is_none() {
                switch_frame = Some(frame);
            }
            state = next;
        }

        assert_eq!(switch_frame, Some(11));
    }

    #[test]
    fn test_switch_gap_property() {
        // Under an adversarial detection stream, consecutive switches are
        // always more than min_frames_before_switch frames apart.
        let min_frames = 7u32;
        let tracker = tracker(min_frames);
        let mut state = TrackerState::new();
        let mut last_switch: Option<u32> = None;
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

        for frame in 0..5_000u32 {
            // xorshift64 noise driving both motion scores
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let left_motion = (seed % 2_000) as f64;
            let right_motion = ((seed >> 16) % 2_000) as f64;

            let dets = [
                det(Side::Left, 400.0, left_motion),
                det(Side::Right, 1500.0, right_motion),
            ];
            let before = state.current_target_x.map(|t| Side::of(t, WIDTH));
            let (next, target) = tracker.step(state, &dets);
            let after = Side::of(target, WIDTH);

            if let Some(before) = before {
                if before != after {
                    if let Some(prev) = last_switch {
                        assert!(
                            frame - prev > min_frames,
                            "switches at frames {} and {} violate the hysteresis floor",
                            prev,
                            frame
                        );
                    }
                    last_switch = Some(frame);
                }
            }
            state = next;
        }

        assert!(last_switch.is_some(), "expected at least one switch");
    }
}
