mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use video2ppt_core::{FfmpegBackend, Locale, Outcome, Pipeline, PipelineConfig, TracingSink};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    let locale: Locale = cli.lang.into();

    info!(video = ?cli.video, output = ?cli.output, interval = cli.interval, "starting conversion");

    let config = PipelineConfig {
        interval_secs: cli.interval,
        output: cli.output,
        temp_root: cli.temp_dir,
        locale,
    };

    let pipeline = Pipeline::new(FfmpegBackend, TracingSink::new(locale));
    let report = pipeline
        .convert(&cli.video, &config)
        .with_context(|| format!("failed to convert {}", cli.video.display()))?;

    if let Some(err) = &report.cleanup_error {
        warn!(path = ?err.path, "temporary frames were not removed");
    }

    match report.outcome {
        Outcome::Written {
            output,
            image_slides,
        } => info!(?output, image_slides, "deck written"),
        Outcome::NoFrames => warn!("video produced no frames, no deck written"),
    }

    Ok(())
}
