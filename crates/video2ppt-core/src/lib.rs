//! Turn a video into a slide deck: sample one frame every N seconds, place
//! each sample on its own full-bleed slide behind a title slide, and discard
//! the intermediate images.

pub mod deck;
pub mod error;
pub mod events;
pub mod messages;
pub mod pipeline;
pub mod sampler;
pub mod video;

pub use error::{CleanupError, ConvertError, DeckError};
pub use events::{EventSink, NoopSink, PipelineEvent, Stage, TracingSink};
pub use messages::Locale;
pub use pipeline::{default_output_path, ConversionReport, Outcome, Pipeline, PipelineConfig};
pub use video::decoder::FfmpegBackend;
