use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, info};

use crate::error::ConvertError;
use crate::events::{EventSink, PipelineEvent};
use crate::video::{VideoBackend, VideoSource};

/// One sampled frame persisted to the temporary store.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Position in the sampled sequence (0-based, contiguous).
    pub index: usize,
    /// Frame number as reported by the source.
    pub frame_number: u64,
    /// Presentation time of the frame, as reported by the source.
    pub timestamp_seconds: f64,
    pub path: PathBuf,
}

/// Number of raw frames between two samples: `floor(fps * interval)`, never below 1.
pub fn stride_for(fps: f64, interval_secs: u32) -> u64 {
    let raw = (fps * interval_secs as f64).floor();
    if raw.is_finite() && raw >= 1.0 {
        raw as u64
    } else {
        1
    }
}

/// Zero-padded so that lexical order matches sampling order.
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:06}.jpg")
}

/// Walks a video in decode order and keeps every `stride`-th frame as a JPEG.
pub struct FrameSampler<'a> {
    backend: &'a dyn VideoBackend,
    sink: &'a dyn EventSink,
}

impl<'a> FrameSampler<'a> {
    pub fn new(backend: &'a dyn VideoBackend, sink: &'a dyn EventSink) -> Self {
        Self { backend, sink }
    }

    /// Open `source_path` and sample it into `store_dir`.
    ///
    /// The source handle is dropped before this returns, on success or error.
    pub fn extract(
        &self,
        source_path: &Path,
        interval_secs: u32,
        store_dir: &Path,
    ) -> Result<Vec<FrameRecord>, ConvertError> {
        let mut source =
            self.backend
                .open(source_path)
                .map_err(|e| ConvertError::SourceUnavailable {
                    path: source_path.to_path_buf(),
                    source: e.into(),
                })?;

        self.sample(source.as_mut(), interval_secs, store_dir)
    }

    /// Sample an already opened source into `store_dir`.
    pub fn sample(
        &self,
        source: &mut dyn VideoSource,
        interval_secs: u32,
        store_dir: &Path,
    ) -> Result<Vec<FrameRecord>, ConvertError> {
        let fps = source.fps();
        let frame_count = source.frame_count();
        let duration_secs = if fps > 0.0 {
            frame_count as f64 / fps
        } else {
            0.0
        };
        let stride = stride_for(fps, interval_secs);

        info!(fps, frame_count, duration_secs, stride, interval_secs, "sampling video");
        self.sink.emit(&PipelineEvent::VideoOpened {
            fps,
            frame_count,
            duration_secs,
            stride,
        });

        let mut records = Vec::new();
        let mut decoded: u64 = 0;

        loop {
            let frame = source.next_frame().map_err(|e| ConvertError::Decode {
                decoded,
                source: e.into(),
            })?;
            let Some(frame) = frame else {
                break;
            };
            // Cadence follows decode order, whatever numbering the source uses.
            let position = decoded;
            decoded += 1;
            if position % stride != 0 {
                continue;
            }

            let index = records.len();
            let path = store_dir.join(frame_file_name(index));
            frame
                .image
                .save_with_format(&path, ImageFormat::Jpeg)
                .map_err(|source| ConvertError::FrameWrite {
                    path: path.clone(),
                    source,
                })?;

            debug!(
                index,
                frame_number = frame.frame_number,
                timestamp_seconds = frame.timestamp_seconds,
                ?path,
                "saved sampled frame"
            );
            self.sink.emit(&PipelineEvent::FrameSampled {
                index,
                frame_number: frame.frame_number,
                timestamp_seconds: frame.timestamp_seconds,
            });

            records.push(FrameRecord {
                index,
                frame_number: frame.frame_number,
                timestamp_seconds: frame.timestamp_seconds,
                path,
            });
        }

        info!(sampled = records.len(), decoded, "sampling complete");
        self.sink.emit(&PipelineEvent::SamplingFinished {
            sampled: records.len(),
            decoded,
        });

        Ok(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use anyhow::{anyhow, bail, Result};
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::events::NoopSink;
    use crate::video::frame::Frame;

    /// Produces `total` solid-colour frames; optionally fails at `fail_at`.
    pub(crate) struct FakeSource {
        pub fps: f64,
        pub total: u64,
        pub next: u64,
        pub fail_at: Option<u64>,
        pub dropped: Rc<Cell<bool>>,
    }

    impl FakeSource {
        pub(crate) fn new(fps: f64, total: u64) -> Self {
            Self {
                fps,
                total,
                next: 0,
                fail_at: None,
                dropped: Rc::new(Cell::new(false)),
            }
        }
    }

    impl VideoSource for FakeSource {
        fn fps(&self) -> f64 {
            self.fps
        }

        fn frame_count(&self) -> u64 {
            self.total
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            if Some(self.next) == self.fail_at {
                bail!("corrupt packet at frame {}", self.next);
            }
            if self.next >= self.total {
                return Ok(None);
            }
            let shade = (self.next % 256) as u8;
            let image = RgbImage::from_pixel(8, 6, Rgb([shade, 0, 255 - shade]));
            let frame = Frame::new(image, self.next, self.fps);
            self.next += 1;
            Ok(Some(frame))
        }
    }

    impl Drop for FakeSource {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    struct Unopenable;

    impl VideoBackend for Unopenable {
        fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
            Err(anyhow!("unsupported codec in {}", path.display()))
        }
    }

    fn sample(source: &mut FakeSource, interval: u32, dir: &Path) -> Vec<FrameRecord> {
        let sampler = FrameSampler::new(&Unopenable, &NoopSink);
        sampler.sample(source, interval, dir).unwrap()
    }

    #[test]
    fn stride_is_frames_per_interval() {
        assert_eq!(stride_for(30.0, 1), 30);
        assert_eq!(stride_for(29.97, 2), 59);
        assert_eq!(stride_for(24.0, 5), 120);
    }

    #[test]
    fn stride_never_drops_below_one() {
        assert_eq!(stride_for(0.0, 1), 1);
        assert_eq!(stride_for(0.4, 1), 1);
        assert_eq!(stride_for(30.0, 0), 1);
        assert_eq!(stride_for(f64::NAN, 3), 1);
        assert_eq!(stride_for(-10.0, 3), 1);
    }

    #[test]
    fn file_names_sort_in_sampling_order() {
        let mut names: Vec<String> = [11, 2, 100, 0]
            .iter()
            .map(|&i| frame_file_name(i))
            .collect();
        names.sort();
        assert_eq!(
            names,
            [
                "frame_000000.jpg",
                "frame_000002.jpg",
                "frame_000011.jpg",
                "frame_000100.jpg",
            ]
        );
    }

    #[test]
    fn thirty_seconds_at_thirty_fps_yields_thirty_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(30.0, 900);
        let records = sample(&mut source, 1, dir.path());

        assert_eq!(records.len(), 30);
        for (k, r) in records.iter().enumerate() {
            assert_eq!(r.index, k);
            assert_eq!(r.frame_number, k as u64 * 30);
            assert!(r.path.exists());
        }
    }

    #[test]
    fn first_sample_is_frame_zero_and_order_is_temporal() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(25.0, 130);
        let records = sample(&mut source, 2, dir.path());

        assert_eq!(records[0].frame_number, 0);
        assert_eq!(records.len(), 3);
        for pair in records.windows(2) {
            assert_eq!(pair[1].frame_number - pair[0].frame_number, 50);
            assert!(pair[0].timestamp_seconds < pair[1].timestamp_seconds);
            assert!(pair[0].path < pair[1].path);
        }
    }

    /// Numbers its frames from `first` instead of zero.
    struct OffsetSource {
        inner: FakeSource,
        first: u64,
    }

    impl VideoSource for OffsetSource {
        fn fps(&self) -> f64 {
            self.inner.fps()
        }

        fn frame_count(&self) -> u64 {
            self.inner.frame_count()
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Ok(self.inner.next_frame()?.map(|mut frame| {
                frame.frame_number += self.first;
                frame
            }))
        }
    }

    #[test]
    fn cadence_ignores_source_frame_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = OffsetSource {
            inner: FakeSource::new(30.0, 29),
            first: 1,
        };
        let sampler = FrameSampler::new(&Unopenable, &NoopSink);
        let records = sampler.sample(&mut source, 1, dir.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[0].frame_number, 1);
        assert!(records[0].path.exists());
    }

    #[test]
    fn offset_numbering_keeps_stride_spacing() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = OffsetSource {
            inner: FakeSource::new(10.0, 35),
            first: 7,
        };
        let sampler = FrameSampler::new(&Unopenable, &NoopSink);
        let records = sampler.sample(&mut source, 1, dir.path()).unwrap();

        let numbers: Vec<u64> = records.iter().map(|r| r.frame_number).collect();
        assert_eq!(numbers, [7, 17, 27, 37]);
    }

    #[test]
    fn zero_fps_samples_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(0.0, 7);
        let records = sample(&mut source, 1, dir.path());
        assert_eq!(records.len(), 7);
    }

    #[test]
    fn empty_video_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(30.0, 0);
        let records = sample(&mut source, 1, dir.path());
        assert!(records.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn sampled_frames_are_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(10.0, 10);
        let records = sample(&mut source, 1, dir.path());
        let format = image::ImageFormat::from_path(&records[0].path).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        let img = image::open(&records[0].path).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn decode_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(1.0, 10);
        source.fail_at = Some(4);
        let sampler = FrameSampler::new(&Unopenable, &NoopSink);
        let err = sampler.sample(&mut source, 1, dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { decoded: 4, .. }));
    }

    #[test]
    fn unopenable_source_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = FrameSampler::new(&Unopenable, &NoopSink);
        let err = sampler
            .extract(Path::new("broken.mkv"), 1, dir.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::SourceUnavailable { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
