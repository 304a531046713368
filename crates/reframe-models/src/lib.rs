//! Shared data types for the reframe engine.
//!
//! These types cross the boundary between detection, tracking, planning
//! and rendering, and are serde-derived so intermediate results can be
//! dumped for debugging or golden-file comparison.

pub mod detection;
pub mod geometry;
pub mod plan;

pub use detection::{Side, SpeakerDetection};
pub use geometry::BoundingBox;
pub use plan::CropPlan;
