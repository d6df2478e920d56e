use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried across the decoding seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure that ends a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("video file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("sample interval must be at least 1 second, got {0}")]
    InvalidInterval(u32),

    #[error("failed to create temporary frame directory")]
    TempStore(#[source] std::io::Error),

    #[error("unable to open video file: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("video decoding failed after {decoded} frames")]
    Decode {
        decoded: u64,
        #[source]
        source: BoxError,
    },

    #[error("failed to write frame image {}", path.display())]
    FrameWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build slide deck")]
    Build(#[from] DeckError),
}

/// A failure while composing or saving the deck.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read frame image {}", path.display())]
    FrameRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write deck to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to assemble deck package")]
    Package(#[from] zip::result::ZipError),
}

/// The temporary frame directory could not be removed. Never fatal.
#[derive(Debug, Error)]
#[error("failed to remove temporary directory {}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
