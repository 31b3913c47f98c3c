use crate::error::CaptureError;
use image::RgbaImage;

/// Source of draft-board frames
///
/// Implemented by the host application: window capture, a replay feed, or
/// a fixture in tests. The scanner only ever asks for the next frame.
pub trait FrameSource: Send + Sync {
    /// Grab one frame of the draft screen
    fn capture(&self) -> Result<RgbaImage, CaptureError>;
}

/// Serve frames from a fixed list, cycling on exhaustion
///
/// Useful for replays and development without a live game window.
pub struct StaticFrames {
    frames: Vec<RgbaImage>,
    next: std::sync::atomic::AtomicUsize,
}

impl StaticFrames {
    pub fn new(frames: Vec<RgbaImage>) -> Result<Self, CaptureError> {
        if frames.is_empty() {
            return Err(CaptureError::Failed("no frames provided".to_string()));
        }
        Ok(Self {
            frames,
            next: std::sync::atomic::AtomicUsize::new(0),
        })
    }
}

impl FrameSource for StaticFrames {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let idx = self
            .next
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.frames[idx % self.frames.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_static_frames_cycle() {
        let a = RgbaImage::from_pixel(4, 4, Rgba([1, 0, 0, 255]));
        let b = RgbaImage::from_pixel(4, 4, Rgba([2, 0, 0, 255]));
        let source = StaticFrames::new(vec![a.clone(), b.clone()]).unwrap();

        assert_eq!(source.capture().unwrap(), a);
        assert_eq!(source.capture().unwrap(), b);
        assert_eq!(source.capture().unwrap(), a, "wraps around");
    }

    #[test]
    fn test_static_frames_rejects_empty() {
        assert!(StaticFrames::new(Vec::new()).is_err());
    }
}
