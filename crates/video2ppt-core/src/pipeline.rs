use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{error, info, warn};

use crate::deck::{BuildStatus, DeckBuilder, DECK_EXTENSION};
use crate::error::{CleanupError, ConvertError};
use crate::events::{EventSink, PipelineEvent, Stage};
use crate::messages::Locale;
use crate::sampler::FrameSampler;
use crate::video::VideoBackend;

/// Parameters for one conversion run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds of video between two sampled frames.
    pub interval_secs: u32,
    /// Deck path, or None for `{stem}_output.pptx` in the working directory.
    pub output: Option<PathBuf>,
    /// Directory under which the per-run frame directory is created, or None
    /// for the system temp directory.
    pub temp_root: Option<PathBuf>,
    pub locale: Locale,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            output: None,
            temp_root: None,
            locale: Locale::default(),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { output: PathBuf, image_slides: usize },
    /// Sampling produced no frames; no deck was written.
    NoFrames,
}

/// Result of a run that did not fail.
#[derive(Debug)]
pub struct ConversionReport {
    pub outcome: Outcome,
    /// Set when the temporary frames could not be removed.
    pub cleanup_error: Option<CleanupError>,
}

/// `clip.mp4` becomes `clip_output.pptx`, relative to the working directory.
pub fn default_output_path(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    PathBuf::from(format!("{stem}_output.{DECK_EXTENSION}"))
}

/// Samples a video and builds a deck from the samples, then removes the
/// temporary frames whatever happened.
pub struct Pipeline<B, S> {
    backend: B,
    sink: S,
}

impl<B: VideoBackend, S: EventSink> Pipeline<B, S> {
    pub fn new(backend: B, sink: S) -> Self {
        Self { backend, sink }
    }

    /// Run one conversion.
    ///
    /// Errors from sampling or building are returned unchanged after the
    /// temporary directory has been removed. A failure to remove it is only
    /// reported and never replaces the run's own result.
    pub fn convert(
        &self,
        video: &Path,
        config: &PipelineConfig,
    ) -> Result<ConversionReport, ConvertError> {
        self.stage(Stage::Idle);
        self.stage(Stage::Validating);

        if let Err(e) = validate(video, config) {
            return Err(self.fail(e));
        }

        let output = config
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(video));

        info!(?video, ?output, interval_secs = config.interval_secs, "conversion starting");
        self.sink.emit(&PipelineEvent::Started {
            input: video,
            output: &output,
        });

        let store = match create_store(config.temp_root.as_deref()) {
            Ok(store) => store,
            Err(e) => return Err(self.fail(e)),
        };
        info!(path = ?store.path(), "temporary frame directory created");

        let result = self.run_stages(video, &output, config, store.path());

        self.stage(Stage::CleaningUp);
        let cleanup_error = self.cleanup(store);

        match result {
            Ok(outcome) => {
                info!(?outcome, "conversion finished");
                self.stage(Stage::Done);
                Ok(ConversionReport {
                    outcome,
                    cleanup_error,
                })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn run_stages(
        &self,
        video: &Path,
        output: &Path,
        config: &PipelineConfig,
        store_dir: &Path,
    ) -> Result<Outcome, ConvertError> {
        self.stage(Stage::Sampling);
        let frames = FrameSampler::new(&self.backend, &self.sink).extract(
            video,
            config.interval_secs,
            store_dir,
        )?;

        self.stage(Stage::Building);
        let builder = DeckBuilder::new(config.locale, &self.sink);
        let status = builder.build(&frames, &source_name(video), output)?;

        Ok(match status {
            BuildStatus::Written { path, image_slides } => Outcome::Written {
                output: path,
                image_slides,
            },
            BuildStatus::Skipped => Outcome::NoFrames,
        })
    }

    fn cleanup(&self, store: TempDir) -> Option<CleanupError> {
        let path = store.path().to_path_buf();
        match store.close() {
            Ok(()) => {
                self.sink.emit(&PipelineEvent::CleanedUp { path: &path });
                None
            }
            Err(source) => {
                let err = CleanupError { path, source };
                warn!(error = %err, "temporary directory left behind");
                self.sink.emit(&PipelineEvent::CleanupFailed { error: &err });
                Some(err)
            }
        }
    }

    fn stage(&self, stage: Stage) {
        self.sink.emit(&PipelineEvent::StageChanged(stage));
    }

    fn fail(&self, error: ConvertError) -> ConvertError {
        error!(%error, "conversion failed");
        self.sink.emit(&PipelineEvent::Failed { error: &error });
        self.stage(Stage::Failed);
        error
    }
}

fn validate(video: &Path, config: &PipelineConfig) -> Result<(), ConvertError> {
    if !video.exists() {
        return Err(ConvertError::InputNotFound(video.to_path_buf()));
    }
    if config.interval_secs < 1 {
        return Err(ConvertError::InvalidInterval(config.interval_secs));
    }
    Ok(())
}

/// A fresh, uniquely named directory, so concurrent runs never share one.
fn create_store(root: Option<&Path>) -> Result<TempDir, ConvertError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("video2ppt-");
    let dir = match root {
        Some(root) => {
            std::fs::create_dir_all(root).map_err(ConvertError::TempStore)?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    };
    dir.map_err(ConvertError::TempStore)
}

fn source_name(video: &Path) -> String {
    video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.display().to_string())
}
