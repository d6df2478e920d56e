pub mod package;
pub mod units;
pub mod xml;

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};
use tracing::{debug, info, warn};

use crate::error::DeckError;
use crate::events::{EventSink, PipelineEvent};
use crate::messages::Locale;
use crate::sampler::FrameRecord;
use package::PptxWriter;
use units::Canvas;

/// Title of the first slide and of the document properties.
pub const DECK_TITLE: &str = "Video2PPT";

/// File extension of generated decks.
pub const DECK_EXTENSION: &str = "pptx";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What [`DeckBuilder::build`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Written { path: PathBuf, image_slides: usize },
    /// There were no frames, so no file was produced.
    Skipped,
}

/// Assembles sampled frames into a deck: a title slide, then one full-bleed
/// picture slide per frame in sampling order.
pub struct DeckBuilder<'a> {
    canvas: Canvas,
    locale: Locale,
    sink: &'a dyn EventSink,
}

impl<'a> DeckBuilder<'a> {
    pub fn new(locale: Locale, sink: &'a dyn EventSink) -> Self {
        Self {
            canvas: Canvas::STANDARD,
            locale,
            sink,
        }
    }

    /// Build the deck, stamping the title slide with the current local time.
    pub fn build(
        &self,
        frames: &[FrameRecord],
        source_name: &str,
        output: &Path,
    ) -> Result<BuildStatus, DeckError> {
        self.build_at(frames, source_name, output, Local::now())
    }

    /// Build the deck with an explicit generation time.
    ///
    /// Any existing file at `output` is replaced. The package is assembled in
    /// a temporary file next to `output` and renamed into place once complete.
    pub fn build_at(
        &self,
        frames: &[FrameRecord],
        source_name: &str,
        output: &Path,
        generated_at: DateTime<Local>,
    ) -> Result<BuildStatus, DeckError> {
        if frames.is_empty() {
            warn!(?output, "no frames to place, deck not written");
            self.sink.emit(&PipelineEvent::NoFrames);
            return Ok(BuildStatus::Skipped);
        }

        let write_err = |source: std::io::Error| DeckError::Write {
            path: output.to_path_buf(),
            source,
        };

        let dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let staging = tempfile::Builder::new()
            .prefix(".video2ppt-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(write_err)?;

        let created = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut writer =
            PptxWriter::new(BufWriter::new(staging), self.canvas, DECK_TITLE, &created);

        let stamp = generated_at.format(TIMESTAMP_FORMAT).to_string();
        let time_line = format!("{}: {}", self.locale.conversion_time_label(), stamp);
        let source_line = format!("{}: {}", self.locale.source_file_label(), source_name);
        writer.add_title_slide(DECK_TITLE, &[time_line.as_str(), source_line.as_str()])?;

        let total = frames.len();
        for (i, frame) in frames.iter().enumerate() {
            let jpeg = fs::read(&frame.path).map_err(|source| DeckError::FrameRead {
                path: frame.path.clone(),
                source,
            })?;
            let descr = frame
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writer.add_picture_slide(&jpeg, self.canvas.full_bleed(), &descr)?;
            debug!(
                slide = i + 2,
                frame_number = frame.frame_number,
                at_secs = frame.timestamp_seconds,
                "picture slide added"
            );
            self.sink.emit(&PipelineEvent::SlideAdded {
                index: i + 1,
                total,
            });
        }

        let slide_count = writer.slide_count();
        let staging = writer
            .finish()?
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?;
        staging
            .persist(output)
            .map_err(|e| write_err(e.error))?;

        info!(?output, slide_count, "deck saved");
        self.sink.emit(&PipelineEvent::DeckSaved {
            path: output,
            slide_count,
        });

        Ok(BuildStatus::Written {
            path: output.to_path_buf(),
            image_slides: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::Read;

    use chrono::TimeZone;
    use image::{Rgb, RgbImage};
    use tracing_test::traced_test;
    use zip::ZipArchive;

    use super::*;
    use crate::events::NoopSink;

    fn write_frames(dir: &Path, n: usize) -> Vec<FrameRecord> {
        (0..n)
            .map(|index| {
                let path = dir.join(crate::sampler::frame_file_name(index));
                // Deliberately not 4:3.
                RgbImage::from_pixel(32, 9, Rgb([index as u8 * 40, 10, 10]))
                    .save(&path)
                    .unwrap();
                FrameRecord {
                    index,
                    frame_number: index as u64 * 30,
                    timestamp_seconds: index as f64,
                    path,
                }
            })
            .collect()
    }

    fn part(archive: &mut ZipArchive<File>, name: &str) -> String {
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap()
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl EventSink for Recorder {
        fn emit(&self, event: &PipelineEvent<'_>) {
            self.0.borrow_mut().push(format!("{event:?}"));
        }
    }

    #[test]
    fn one_title_slide_then_one_slide_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frames(dir.path(), 3);
        let output = dir.path().join("clip_output.pptx");

        let status = DeckBuilder::new(Locale::En, &NoopSink)
            .build_at(&frames, "clip.mp4", &output, fixed_time())
            .unwrap();
        assert_eq!(
            status,
            BuildStatus::Written {
                path: output.clone(),
                image_slides: 3
            }
        );

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let slides = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide"))
            .count();
        assert_eq!(slides, 4);

        let title = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains("<a:t>Video2PPT</a:t>"));
        assert!(title.contains("<a:t>Conversion time: 2026-10-16 09:05:07</a:t>"));
        assert!(title.contains("<a:t>Source file: clip.mp4</a:t>"));

        // Slide k+2 carries frame k.
        for (k, frame) in frames.iter().enumerate() {
            let slide = part(&mut archive, &format!("ppt/slides/slide{}.xml", k + 2));
            assert!(slide.contains(r#"<a:off x="0" y="0"/><a:ext cx="9144000" cy="6858000"/>"#));
            assert!(slide.contains(&format!(r#"descr="frame_{k:06}.jpg""#)));

            let mut embedded = Vec::new();
            archive
                .by_name(&format!("ppt/media/image{}.jpeg", k + 1))
                .unwrap()
                .read_to_end(&mut embedded)
                .unwrap();
            assert_eq!(embedded, fs::read(&frame.path).unwrap());
        }

        let pres = part(&mut archive, "ppt/presentation.xml");
        assert!(pres.contains(r#"cx="9144000" cy="6858000""#));
    }

    #[test]
    fn title_labels_follow_locale() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frames(dir.path(), 1);
        let output = dir.path().join("out.pptx");

        DeckBuilder::new(Locale::Zh, &NoopSink)
            .build_at(&frames, "会议.mp4", &output, fixed_time())
            .unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let title = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains("<a:t>源文件: 会议.mp4</a:t>"));
    }

    #[test]
    #[traced_test]
    fn empty_frames_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pptx");
        let recorder = Recorder::default();

        let status = DeckBuilder::new(Locale::En, &recorder)
            .build(&[], "clip.mp4", &output)
            .unwrap();

        assert_eq!(status, BuildStatus::Skipped);
        assert!(!output.exists());
        assert_eq!(*recorder.0.borrow(), ["NoFrames"]);
        assert!(logs_contain("deck not written"));
    }

    #[test]
    fn existing_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frames(dir.path(), 2);
        let output = dir.path().join("out.pptx");
        fs::write(&output, b"stale").unwrap();

        DeckBuilder::new(Locale::En, &NoopSink)
            .build(&frames, "clip.mp4", &output)
            .unwrap();

        let archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert!(archive.len() > 10);
    }

    #[test]
    fn missing_output_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frames(dir.path(), 1);
        let output = dir.path().join("nested/deeper/out.pptx");

        DeckBuilder::new(Locale::En, &NoopSink)
            .build(&frames, "clip.mp4", &output)
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn unreadable_frame_fails_without_leaving_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut frames = write_frames(dir.path(), 2);
        fs::remove_file(&frames[1].path).unwrap();
        frames[1].path = dir.path().join("gone.jpg");
        let output = dir.path().join("out.pptx");

        let err = DeckBuilder::new(Locale::En, &NoopSink)
            .build(&frames, "clip.mp4", &output)
            .unwrap_err();

        assert!(matches!(err, DeckError::FrameRead { .. }));
        assert!(!output.exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    #[traced_test]
    fn slides_are_logged_with_their_frame_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut frames = write_frames(dir.path(), 2);
        frames[1].timestamp_seconds = 2.5;
        let output = dir.path().join("out.pptx");

        DeckBuilder::new(Locale::En, &NoopSink)
            .build(&frames, "clip.mp4", &output)
            .unwrap();

        assert!(logs_contain("slide=3 frame_number=30 at_secs=2.5"));
    }

    #[test]
    fn progress_is_reported_per_slide() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frames(dir.path(), 2);
        let output = dir.path().join("out.pptx");
        let recorder = Recorder::default();

        DeckBuilder::new(Locale::En, &recorder)
            .build(&frames, "clip.mp4", &output)
            .unwrap();

        let events = recorder.0.borrow();
        assert_eq!(events[0], "SlideAdded { index: 1, total: 2 }");
        assert_eq!(events[1], "SlideAdded { index: 2, total: 2 }");
        assert!(events[2].starts_with("DeckSaved"));
    }
}
