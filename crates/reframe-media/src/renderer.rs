//! Second-pass rendering: crop, resize, and write the muted video.
//!
//! Frames are re-decoded in order and cropped with that frame's stabilized
//! crop-x, resized to the output resolution with Lanczos resampling, and
//! appended to an mp4v stream with no audio. Audio is merged afterwards by
//! [`crate::mux`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use opencv::{
    core::{Mat, Rect, Size},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use tracing::{debug, warn};

use reframe_models::CropPlan;

use crate::error::{ReframeError, ReframeResult};

/// Frames between progress log lines.
const HEARTBEAT_FRAMES: usize = 100;

/// Render the stabilized crop plan into a muted video file.
///
/// The capture and writer handles are scoped to this call: opened here,
/// fully drained, and closed on return. A write failure leaves cleanup of
/// the (temporary) output to the caller.
pub fn render_cropped(
    input: &Path,
    output: &Path,
    plan: &CropPlan,
    crop_width: i32,
    output_size: (i32, i32),
    fps: f64,
    cancel: Option<&AtomicBool>,
) -> ReframeResult<()> {
    let input_str = input.to_str().unwrap_or("");
    let mut cap = VideoCapture::from_file(input_str, videoio::CAP_ANY)
        .map_err(|e| ReframeError::input_failed(format!("Failed to open video: {}", e)))?;
    if !cap.is_opened().unwrap_or(false) {
        return Err(ReframeError::input_failed(format!(
            "Cannot open video for rendering: {}",
            input.display()
        )));
    }

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')
        .map_err(|e| ReframeError::render_failed(format!("Bad fourcc: {}", e)))?;
    let (out_w, out_h) = output_size;
    let mut writer = VideoWriter::new(
        output.to_str().unwrap_or(""),
        fourcc,
        fps,
        Size::new(out_w, out_h),
        true,
    )
    .map_err(|e| ReframeError::render_failed(format!("Failed to create encoder: {}", e)))?;
    if !writer.is_opened().unwrap_or(false) {
        return Err(ReframeError::render_failed(format!(
            "Encoder refused output {}",
            output.display()
        )));
    }

    let mut frame = Mat::default();
    let mut resized = Mat::default();

    for (frame_idx, &crop_x) in plan.iter().enumerate() {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(ReframeError::Cancelled);
            }
        }

        let ok = cap
            .read(&mut frame)
            .map_err(|e| ReframeError::render_failed(format!("Frame read: {}", e)))?;
        if !ok || frame.empty() {
            warn!(
                frame = frame_idx,
                planned = plan.len(),
                "Source ended before the crop plan was exhausted"
            );
            break;
        }

        let crop_h = frame.rows();
        let crop_w = crop_width.min(frame.cols() - crop_x);
        let roi = Mat::roi(&frame, Rect::new(crop_x, 0, crop_w, crop_h))
            .map_err(|e| ReframeError::render_failed(format!("Crop ROI: {}", e)))?;

        imgproc::resize(
            &roi,
            &mut resized,
            Size::new(out_w, out_h),
            0.0,
            0.0,
            imgproc::INTER_LANCZOS4,
        )
        .map_err(|e| ReframeError::render_failed(format!("Resize: {}", e)))?;

        writer
            .write(&resized)
            .map_err(|e| ReframeError::render_failed(format!("Frame encode: {}", e)))?;

        if frame_idx > 0 && frame_idx % HEARTBEAT_FRAMES == 0 {
            debug!(frame = frame_idx, total = plan.len(), "Render progress");
        }
    }

    Ok(())
}
