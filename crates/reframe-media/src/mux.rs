//! Final packaging: merge the muted render with the original audio.
//!
//! One ffmpeg invocation re-encodes the video stream (the mp4v
//! intermediate is not distribution quality) and stream-copies the
//! original audio into the output container. A non-success exit is fatal
//! and leaves no partial output behind.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ReframeError, ReframeResult};

/// Build the ffmpeg argument list for the mux step.
fn build_mux_args(
    video_only: &Path,
    original: &Path,
    output: &Path,
    has_audio: bool,
    preset: &str,
    crf: u32,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        video_only.to_string_lossy().into_owned(),
        "-i".into(),
        original.to_string_lossy().into_owned(),
        "-map".into(),
        "0:v:0".into(),
    ];
    if has_audio {
        args.extend(["-map".into(), "1:a:0".into(), "-c:a".into(), "copy".into()]);
    }
    args.extend([
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        preset.to_string(),
        "-crf".into(),
        crf.to_string(),
        "-shortest".into(),
        "-movflags".into(),
        "+faststart".into(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

/// Mux the muted render with the original file's audio track.
///
/// When the source has no audio stream the output is written video-only.
/// On failure any partially written output file is removed.
pub async fn mux_audio(
    video_only: &Path,
    original: &Path,
    output: &Path,
    has_audio: bool,
    preset: &str,
    crf: u32,
) -> ReframeResult<()> {
    which::which("ffmpeg").map_err(|_| ReframeError::FfmpegNotFound)?;

    let args = build_mux_args(video_only, original, output, has_audio, preset, crf);
    debug!(?args, "Running ffmpeg mux");

    let result = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ReframeError::mux_failed(format!("Failed to run ffmpeg: {}", e), None, None))?;

    if !result.status.success() {
        // No truncated artifacts: either a complete output exists or none
        let _ = tokio::fs::remove_file(output).await;
        let stderr = String::from_utf8_lossy(&result.stderr).to_string();
        return Err(ReframeError::mux_failed(
            "ffmpeg mux returned non-success status",
            Some(stderr),
            result.status.code(),
        ));
    }

    Ok(())
}
