//! Two-pass reframing pipeline.
//!
//! Pass 1 walks every frame in order: detect speakers, advance the
//! hysteresis tracker, project the target into a crop offset. The full
//! plan is then shot-stabilized before pass 2 re-reads the frames and
//! renders the cropped portrait stream, which is finally muxed with the
//! original audio. Pass 1 must complete before pass 2 starts because shot
//! boundaries are only knowable with the whole trajectory in hand.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

use reframe_models::CropPlan;

use crate::config::ReframeConfig;
use crate::detector::FaceMotionDetector;
use crate::error::{ReframeError, ReframeResult};
use crate::mux::mux_audio;
use crate::planner::CropPlanner;
use crate::probe::{probe_video, VideoInfo};
use crate::renderer::render_cropped;
use crate::stabilizer::stabilize_shots;
use crate::tracker::{SpeakerTracker, TrackerState};

/// Frames between progress log lines.
const HEARTBEAT_FRAMES: usize = 100;

/// Landscape-to-portrait reframer with cut-based speaker tracking.
pub struct PortraitReframer {
    config: ReframeConfig,
}

impl PortraitReframer {
    /// Create a reframer with the given configuration.
    pub fn new(config: ReframeConfig) -> Self {
        Self { config }
    }

    /// Reframe `input` into a portrait video at `output`.
    pub async fn process(&self, input: &Path, output: &Path) -> ReframeResult<()> {
        self.run(input, output, None).await
    }

    /// Reframe with a cooperative cancellation flag, checked between frames.
    pub async fn process_with_cancel(
        &self,
        input: &Path,
        output: &Path,
        cancel: &AtomicBool,
    ) -> ReframeResult<()> {
        self.run(input, output, Some(cancel)).await
    }

    async fn run(
        &self,
        input: &Path,
        output: &Path,
        cancel: Option<&AtomicBool>,
    ) -> ReframeResult<()> {
        let info = probe_video(input).await?;
        let planner = CropPlanner::new(info.width, info.height);
        let fps = self.config.output_fps.unwrap_or(info.fps);

        info!(
            input = %input.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            crop_width = planner.crop_width(),
            has_audio = info.has_audio,
            "Starting portrait reframe"
        );

        // Pass 1: detect, track, plan
        let mut plan = self.analyze(input, &info, &planner, cancel)?;
        info!(frames = plan.len(), "Analysis pass complete");

        stabilize_shots(&mut plan, self.config.cut_threshold);

        // Pass 2: render the muted intermediate, then merge audio.
        // NamedTempFile cleans the intermediate up on every exit path.
        let temp = tempfile::Builder::new()
            .prefix("reframe-")
            .suffix(".mp4")
            .tempfile()?;

        render_cropped(
            input,
            temp.path(),
            &plan,
            planner.crop_width(),
            (self.config.output_width, self.config.output_height),
            fps,
            cancel,
        )?;
        info!("Render pass complete, merging audio");

        mux_audio(
            temp.path(),
            input,
            output,
            info.has_audio,
            &self.config.render_preset,
            self.config.render_crf,
        )
        .await?;

        info!(output = %output.display(), "Portrait reframe complete");
        Ok(())
    }

    /// Pass 1: one stabilization-ready crop offset per decodable frame.
    fn analyze(
        &self,
        input: &Path,
        info: &VideoInfo,
        planner: &CropPlanner,
        cancel: Option<&AtomicBool>,
    ) -> ReframeResult<CropPlan> {
        let input_str = input.to_str().unwrap_or("");
        let mut cap = VideoCapture::from_file(input_str, videoio::CAP_ANY)
            .map_err(|e| ReframeError::input_failed(format!("Failed to open video: {}", e)))?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(ReframeError::input_failed(format!(
                "Cannot open video: {}",
                input.display()
            )));
        }

        let mut detector = FaceMotionDetector::new(&self.config, info.width)?;
        let tracker = SpeakerTracker::new(&self.config, info.width);
        let mut state = TrackerState::new();

        let mut plan = CropPlan::new();
        let mut frame = Mat::default();
        let mut gray = Mat::default();
        let mut empty_frames = 0usize;

        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(ReframeError::Cancelled);
                }
            }

            let ok = cap
                .read(&mut frame)
                .map_err(|e| ReframeError::input_failed(format!("Frame decode: {}", e)))?;
            if !ok || frame.empty() {
                break;
            }

            if frame.channels() == 3 {
                imgproc::cvt_color(
                    &frame,
                    &mut gray,
                    imgproc::COLOR_BGR2GRAY,
                    0,
                )
                .map_err(|e| ReframeError::input_failed(format!("Grayscale: {}", e)))?;
            } else {
                gray = frame
                    .try_clone()
                    .map_err(|e| ReframeError::input_failed(format!("Frame clone: {}", e)))?;
            }

            let detections = detector.detect(&gray)?;
            if detections.is_empty() {
                empty_frames += 1;
            }

            let (next_state, target_x) = tracker.step(state, &detections);
            state = next_state;
            plan.push(planner.plan(target_x));

            if plan.len() % HEARTBEAT_FRAMES == 0 {
                debug!(frame = plan.len(), "Analysis progress");
            }
        }

        if plan.is_empty() {
            return Err(ReframeError::input_failed(format!(
                "No decodable frames in {}",
                input.display()
            )));
        }

        if empty_frames > 0 {
            warn!(
                empty_frames,
                total = plan.len(),
                "Frames without any face detection; target held over those spans"
            );
        }
        if detector.crowded_frames() > 0 {
            warn!(
                crowded_frames = detector.crowded_frames(),
                "Frames exceeded the two-speaker assumption; extra faces dropped per side"
            );
        }

        Ok(plan)
    }
}

/// Default output path for a given input: `<stem>_portrait.<ext>`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    input
        .with_file_name(format!("{}_portrait.{}", stem, ext))
}
