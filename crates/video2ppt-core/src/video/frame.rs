use image::RgbImage;

/// A single decoded video frame, in decode order.
pub struct Frame {
    pub image: RgbImage,
    /// Raw decode index from the start of the source (0-based).
    pub frame_number: u64,
    /// Elapsed seconds from the start of the source, or 0.0 when the frame rate is unknown.
    pub timestamp_seconds: f64,
}

impl Frame {
    pub fn new(image: RgbImage, frame_number: u64, fps: f64) -> Self {
        let timestamp_seconds = if fps > 0.0 {
            frame_number as f64 / fps
        } else {
            0.0
        };
        Self {
            image,
            frame_number,
            timestamp_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_follows_frame_rate() {
        let f = Frame::new(RgbImage::new(1, 1), 45, 30.0);
        assert!((f.timestamp_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn timestamp_is_zero_without_frame_rate() {
        let f = Frame::new(RgbImage::new(1, 1), 45, 0.0);
        assert_eq!(f.timestamp_seconds, 0.0);
    }
}
