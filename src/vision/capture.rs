//! Frame acquisition.
//!
//! [`FrameSource`] is a lazy, restartable sequence of frames: every call to
//! [`next_frame`](FrameSource::next_frame) may yield a frame, yield nothing
//! (no frame currently available), or fail — the gesture loop treats the
//! latter two identically and just moves on.
//!
//! Shipped sources:
//!
//! * [`CameraSource`] — live webcam frames via OpenCV (`camera` feature).
//! * [`FrameDirSource`] — replays a directory of still images in sorted
//!   order, wrapping around; used for development and replay.
//! * [`NullFrameSource`] — never yields a frame; installed when no capture
//!   backend is configured so the rest of the app still runs.

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while acquiring frames.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to read frame directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode frame {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("camera error: {0}")]
    Camera(String),
}

// ---------------------------------------------------------------------------
// FrameSource trait
// ---------------------------------------------------------------------------

/// A lazy, infinite, restartable sequence of frames.
pub trait FrameSource: Send {
    /// Acquire the next frame.
    ///
    /// `Ok(None)` means no frame is currently available (not an error);
    /// callers should yield and retry on the next iteration.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError>;
}

// ---------------------------------------------------------------------------
// FrameDirSource
// ---------------------------------------------------------------------------

/// Replays the image files of a directory as an endless frame stream.
///
/// Files are sorted by name and decoded lazily, one per call; after the
/// last file the source wraps around to the first.  An empty directory
/// yields `Ok(None)` forever.
pub struct FrameDirSource {
    files: Vec<PathBuf>,
    next: usize,
}

impl FrameDirSource {
    const EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "bmp"];

    /// List `dir` and keep the supported image files, sorted by name.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let dir = dir.into();
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())
                    .is_some_and(|e| Self::EXTENSIONS.contains(&e.as_str()))
            })
            .collect();
        files.sort();

        if files.is_empty() {
            log::warn!("frame directory {} contains no images", dir.display());
        }

        Ok(Self { files, next: 0 })
    }

    /// Number of frames in one pass over the directory.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` when the directory contained no usable images.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for FrameDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        if self.files.is_empty() {
            return Ok(None);
        }

        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();

        let img = image::open(path).map_err(|e| CaptureError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(img.to_rgb8()))
    }
}

// ---------------------------------------------------------------------------
// NullFrameSource
// ---------------------------------------------------------------------------

/// A frame source that never yields a frame.
///
/// Installed when neither the `camera` feature nor a frame directory is
/// configured; the gesture loop runs but stays inert.
pub struct NullFrameSource;

impl FrameSource for NullFrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// CameraSource  (feature = "camera")
// ---------------------------------------------------------------------------

/// Live webcam frames via OpenCV's `VideoCapture`.
#[cfg(feature = "camera")]
pub struct CameraSource {
    camera: opencv::videoio::VideoCapture,
}

#[cfg(feature = "camera")]
impl CameraSource {
    /// Open camera `index` (0 is the system default).
    pub fn new(index: i32) -> Result<Self, CaptureError> {
        use opencv::prelude::*;
        use opencv::videoio;

        let camera = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        let opened = camera
            .is_opened()
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        if !opened {
            return Err(CaptureError::Camera(format!("camera {index} did not open")));
        }
        Ok(Self { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        use opencv::core::Mat;
        use opencv::prelude::*;

        let mut frame = Mat::default();
        let grabbed = self
            .camera
            .read(&mut frame)
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }

        // OpenCV delivers BGR; swap to RGB while copying out.
        let mut rgb = Mat::default();
        opencv::imgproc::cvt_color(&frame, &mut rgb, opencv::imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| CaptureError::Camera(e.to_string()))?;

        let (w, h) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb
            .data_bytes()
            .map_err(|e| CaptureError::Camera(e.to_string()))?
            .to_vec();

        Ok(RgbImage::from_raw(w, h, bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_png(dir: &std::path::Path, name: &str, color: Rgb<u8>) {
        let img = RgbImage::from_pixel(8, 8, color);
        img.save(dir.join(name)).expect("write png");
    }

    #[test]
    fn null_source_yields_nothing() {
        let mut source = NullFrameSource;
        assert!(source.next_frame().unwrap().is_none());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().expect("temp dir");
        let mut source = FrameDirSource::new(dir.path()).expect("source");
        assert!(source.is_empty());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let missing = dir.path().join("nope");
        assert!(FrameDirSource::new(missing).is_err());
    }

    #[test]
    fn frames_come_back_in_sorted_order_and_wrap() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "b.png", Rgb([0, 255, 0]));
        write_png(dir.path(), "a.png", Rgb([255, 0, 0]));

        let mut source = FrameDirSource::new(dir.path()).expect("source");
        assert_eq!(source.len(), 2);

        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        let third = source.next_frame().unwrap().unwrap();

        assert_eq!(first.get_pixel(0, 0).0, [255, 0, 0]); // a.png
        assert_eq!(second.get_pixel(0, 0).0, [0, 255, 0]); // b.png
        assert_eq!(third.get_pixel(0, 0).0, [255, 0, 0]); // wrapped
    }

    #[test]
    fn non_image_files_are_ignored() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "frame.png", Rgb([1, 2, 3]));
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let source = FrameDirSource::new(dir.path()).expect("source");
        assert_eq!(source.len(), 1);
    }
}
