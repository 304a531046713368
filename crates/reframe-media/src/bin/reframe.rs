//! Portrait reframing CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reframe_media::{default_output_path, PortraitReframer, ReframeConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reframe=info,reframe_media=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(env_filter)
        .init();

    let mut args = std::env::args_os().skip(1);
    let input = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: reframe <input> [output]");
            return ExitCode::from(2);
        }
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input));

    let reframer = PortraitReframer::new(ReframeConfig::default());
    match reframer.process(&input, &output).await {
        Ok(()) => {
            info!(output = %output.display(), "Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Reframing failed");
            ExitCode::FAILURE
        }
    }
}
