//! Speaker identity assignment.
//!
//! Side-of-frame is the only identity the engine carries: a face is "the
//! left speaker" or "the right speaker" by screen position, re-derived
//! every frame. This silently misattributes motion if two people cross
//! sides, so the mapping lives behind a trait and a persistent scheme
//! (e.g. IoU track matching) can be substituted without touching the
//! hysteresis policy.

use reframe_models::{BoundingBox, Side};

/// Maps a face detection to a speaker identity.
pub trait SpeakerIdentity: Send {
    /// Assign a side to a detected face box.
    fn side_of(&self, bbox: &BoundingBox, frame_width: u32) -> Side;
}

/// Default identity: compare the box center against the frame midline.
#[derive(Debug, Default, Clone, Copy)]
pub struct MidlineIdentity;

impl SpeakerIdentity for MidlineIdentity {
    fn side_of(&self, bbox: &BoundingBox, frame_width: u32) -> Side {
        Side::of(bbox.cx(), frame_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midline_identity() {
        let identity = MidlineIdentity;

        let left_face = BoundingBox::new(200.0, 300.0, 100.0, 100.0);
        assert_eq!(identity.side_of(&left_face, 1920), Side::Left);

        let right_face = BoundingBox::new(1500.0, 300.0, 100.0, 100.0);
        assert_eq!(identity.side_of(&right_face, 1920), Side::Right);
    }

    #[test]
    fn test_midline_uses_center_not_edge() {
        let identity = MidlineIdentity;

        // Box starts left of the midline but its center is right of it
        let straddling = BoundingBox::new(900.0, 300.0, 200.0, 200.0);
        assert_eq!(identity.side_of(&straddling, 1920), Side::Right);
    }
}
