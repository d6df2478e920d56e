use std::path::Path;

use tracing::{error, info, warn};

use crate::error::{CleanupError, ConvertError};
use crate::messages::Locale;

/// How often [`TracingSink`] reports sampling progress, in sampled frames.
const PROGRESS_EVERY: usize = 10;

/// Controller lifecycle. `CleaningUp` always precedes `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Sampling,
    Building,
    CleaningUp,
    Done,
    Failed,
}

/// Progress reported by the sampler, builder and controller.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    StageChanged(Stage),
    Started {
        input: &'a Path,
        output: &'a Path,
    },
    VideoOpened {
        fps: f64,
        frame_count: u64,
        duration_secs: f64,
        stride: u64,
    },
    FrameSampled {
        index: usize,
        frame_number: u64,
        timestamp_seconds: f64,
    },
    SamplingFinished {
        sampled: usize,
        decoded: u64,
    },
    SlideAdded {
        index: usize,
        total: usize,
    },
    DeckSaved {
        path: &'a Path,
        slide_count: usize,
    },
    NoFrames,
    CleanedUp {
        path: &'a Path,
    },
    CleanupFailed {
        error: &'a CleanupError,
    },
    Failed {
        error: &'a ConvertError,
    },
}

/// Receives pipeline progress. Purely diagnostic: conversions behave the same
/// whatever the sink does.
pub trait EventSink {
    fn emit(&self, event: &PipelineEvent<'_>);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: &PipelineEvent<'_>) {
        (**self).emit(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &PipelineEvent<'_>) {}
}

/// Writes localized progress lines through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    locale: Locale,
}

impl TracingSink {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &PipelineEvent<'_>) {
        let l = self.locale;
        match *event {
            PipelineEvent::StageChanged(Stage::Sampling) => info!("{}", l.extraction_started()),
            PipelineEvent::StageChanged(Stage::Building) => info!("{}", l.deck_started()),
            PipelineEvent::StageChanged(Stage::Done) => info!("{}", l.completed()),
            PipelineEvent::StageChanged(_) => {}
            PipelineEvent::Started { input, output } => info!("{}", l.initializing(input, output)),
            PipelineEvent::VideoOpened {
                fps,
                frame_count,
                duration_secs,
                stride,
            } => {
                info!(stride, "{}", l.video_info(fps, frame_count, duration_secs))
            }
            PipelineEvent::FrameSampled {
                index,
                timestamp_seconds,
                ..
            } => {
                let sampled = index + 1;
                if sampled % PROGRESS_EVERY == 0 {
                    info!(at_secs = timestamp_seconds, "{}", l.frames_extracted(sampled));
                }
            }
            PipelineEvent::SamplingFinished { sampled, decoded } => {
                info!(decoded, "{}", l.extraction_finished(sampled))
            }
            PipelineEvent::SlideAdded { index, total } => {
                info!("{}", l.slide_progress(index, total))
            }
            PipelineEvent::DeckSaved { path, slide_count } => {
                info!(slide_count, "{}", l.deck_saved(path))
            }
            PipelineEvent::NoFrames => warn!("{}", l.no_frames()),
            PipelineEvent::CleanedUp { path } => info!(?path, "{}", l.cleaned_up()),
            PipelineEvent::CleanupFailed { error } => {
                warn!(path = ?error.path, cause = %error.source, "{}", l.cleanup_failed(error))
            }
            PipelineEvent::Failed { error } => error!("{}", l.failed(error)),
        }
    }
}
