use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread::{self, JoinHandle};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use tracing::{debug, error, info, warn};

use super::frame::Frame;
use super::{VideoBackend, VideoSource};

/// Stream metadata obtained by probing with ffprobe.
#[derive(Debug, Clone, PartialEq)]
struct ProbeResult {
    width: u32,
    height: u32,
    fps: f64,
    frame_count: u64,
    /// Clockwise turn needed to display the stream upright: 0, 90, 180 or 270.
    rotation: u32,
}

impl ProbeResult {
    /// Size of the frames once `rotation_filter` has been applied.
    fn output_size(&self) -> (u32, u32) {
        match self.rotation {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }

    fn rotation_filter(&self) -> Option<&'static str> {
        match self.rotation {
            90 => Some("transpose=clock"),
            180 => Some("hflip,vflip"),
            270 => Some("transpose=cclock"),
            _ => None,
        }
    }
}

fn probe(path: &Path) -> Result<ProbeResult> {
    info!(?path, "probing video metadata with ffprobe");

    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames:stream_tags=rotate:stream_side_data=rotation",
            "-of", "default=noprint_wrappers=1",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("failed to run ffprobe, is ffmpeg installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(%stderr, ?path, "ffprobe failed");
        bail!("ffprobe failed: {}", stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result = parse_probe_output(&stdout)?;

    if result.fps <= 0.0 {
        warn!(?path, "video reports no usable frame rate");
    }

    info!(
        width = result.width,
        height = result.height,
        fps = result.fps,
        frame_count = result.frame_count,
        rotation = result.rotation,
        "probe completed"
    );
    Ok(result)
}

/// Parse ffprobe `key=value` lines for the first video stream.
fn parse_probe_output(stdout: &str) -> Result<ProbeResult> {
    let mut width = None;
    let mut height = None;
    let mut fps = 0.0;
    let mut frame_count = 0;
    let mut display_rotation = None;
    let mut rotate_tag = None;

    for line in stdout.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => width = Some(value.parse::<u32>().context("failed to parse width")?),
            "height" => height = Some(value.parse::<u32>().context("failed to parse height")?),
            "r_frame_rate" => fps = parse_frame_rate(value),
            // "N/A" for containers that don't store a frame count.
            "nb_frames" => frame_count = value.parse().unwrap_or(0),
            // Display matrix angle, counter-clockwise.
            "rotation" => display_rotation = value.parse::<f64>().ok().map(|v| -v),
            // Legacy container tag, clockwise.
            "TAG:rotate" => rotate_tag = value.parse::<f64>().ok(),
            _ => {}
        }
    }

    let (Some(width), Some(height)) = (width, height) else {
        bail!("no video stream found");
    };
    if width == 0 || height == 0 {
        bail!("invalid video dimensions: {width}x{height}");
    }

    let rotation = display_rotation
        .or(rotate_tag)
        .map(quarter_turn)
        .unwrap_or(0);

    Ok(ProbeResult {
        width,
        height,
        fps,
        frame_count,
        rotation,
    })
}

/// Normalize an angle to 0, 90, 180 or 270 degrees. Other angles are ignored.
fn quarter_turn(degrees: f64) -> u32 {
    let normalized = degrees.round().rem_euclid(360.0) as u32;
    if normalized % 90 == 0 {
        normalized
    } else {
        warn!(degrees, "ignoring non-quarter-turn rotation");
        0
    }
}

/// Evaluate a rate such as `30000/1001` or `25`. Anything unusable is 0.0.
fn parse_frame_rate(value: &str) -> f64 {
    let rate = match value.split_once('/') {
        Some((num, den)) => match (num.parse::<f64>(), den.parse::<f64>()) {
            (Ok(num), Ok(den)) if den > 0.0 => num / den,
            _ => 0.0,
        },
        None => value.parse().unwrap_or(0.0),
    };
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}

/// Opens videos by spawning the ffmpeg CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBackend;

impl VideoBackend for FfmpegBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        Ok(Box::new(FfmpegDecoder::open(path)?))
    }
}

/// Decodes video frames by piping raw RGB24 data from the ffmpeg CLI.
pub struct FfmpegDecoder {
    child: Child,
    width: u32,
    height: u32,
    fps: f64,
    reported_frames: u64,
    decoded: u64,
    frame_bytes: usize,
    stderr: Option<JoinHandle<String>>,
}

/// Collect a child's stderr on a separate thread so a chatty ffmpeg can
/// never block on a full pipe while we read its stdout.
fn drain_stderr(pipe: ChildStderr) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut pipe = pipe;
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

impl FfmpegDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        let info = probe(path)?;

        info!(?path, "spawning ffmpeg decoder process");

        // Rotation is applied explicitly so the frame size always matches
        // what the probe reported.
        let mut command = Command::new("ffmpeg");
        command.args(["-noautorotate", "-i"]).arg(path);
        if let Some(filter) = info.rotation_filter() {
            command.args(["-vf", filter]);
        }
        let mut child = command
            .args([
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-v", "error",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn ffmpeg, is ffmpeg installed?")?;

        let stderr = child.stderr.take().map(drain_stderr);
        let (width, height) = info.output_size();
        let frame_bytes = (width as usize) * (height as usize) * 3;

        info!(
            width,
            height,
            rotation = info.rotation,
            fps = info.fps,
            frame_bytes,
            "video decoder opened"
        );

        Ok(Self {
            child,
            width,
            height,
            fps: info.fps,
            reported_frames: info.frame_count,
            decoded: 0,
            frame_bytes,
            stderr,
        })
    }

    /// Reap ffmpeg once its stdout is drained, surfacing a failed decode.
    fn finish(&mut self) -> Result<()> {
        let status = self.child.wait().context("failed to wait for ffmpeg")?;
        if status.success() {
            return Ok(());
        }

        let stderr = self.collect_stderr();
        error!(%status, stderr = stderr.trim(), "ffmpeg exited with failure");
        bail!("ffmpeg exited with {status}: {}", stderr.trim())
    }

    /// Join the stderr reader. Only valid once ffmpeg has exited.
    fn collect_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }
}

impl VideoSource for FfmpegDecoder {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.reported_frames
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let stdout = self
            .child
            .stdout
            .as_mut()
            .context("ffmpeg stdout not available")?;

        let mut buf = vec![0u8; self.frame_bytes];
        let mut read = 0;

        while read < self.frame_bytes {
            match stdout.read(&mut buf[read..]) {
                Ok(0) => {
                    if read == 0 {
                        info!(total_frames = self.decoded, "video stream ended");
                        self.finish()?;
                        return Ok(None);
                    }
                    error!(
                        read_bytes = read,
                        expected_bytes = self.frame_bytes,
                        frame = self.decoded,
                        "ffmpeg stream ended mid-frame"
                    );
                    bail!(
                        "ffmpeg stream ended mid-frame (read {read}/{} bytes)",
                        self.frame_bytes,
                    );
                }
                Ok(n) => read += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    error!(frame = self.decoded, %e, "failed to read from ffmpeg pipe");
                    return Err(e).context("failed to read from ffmpeg pipe");
                }
            }
        }

        let image = RgbImage::from_raw(self.width, self.height, buf)
            .context("failed to create RgbImage from raw frame data")?;

        let frame = Frame::new(image, self.decoded, self.fps);
        self.decoded += 1;

        debug!(
            frame_number = frame.frame_number,
            timestamp_seconds = frame.timestamp_seconds,
            "decoded frame"
        );

        Ok(Some(frame))
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        info!(total_frames = self.decoded, "closing video decoder");
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = self.collect_stderr();
    }
}
