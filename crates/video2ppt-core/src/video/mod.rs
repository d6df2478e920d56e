pub mod decoder;
pub mod frame;

use std::path::Path;

use anyhow::Result;

use frame::Frame;

/// An opened video whose frames can be walked once in decode order.
///
/// The underlying handle is released when the value is dropped, so every exit
/// path out of a sampling loop releases it.
pub trait VideoSource {
    /// Nominal frames per second, or 0.0 when the container does not report one.
    fn fps(&self) -> f64;

    /// Frame count reported by the container, or 0 when unknown.
    fn frame_count(&self) -> u64;

    /// Decode the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Opens video files into [`VideoSource`]s.
pub trait VideoBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>>;
}

impl<B: VideoBackend + ?Sized> VideoBackend for &B {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        (**self).open(path)
    }
}
