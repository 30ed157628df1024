//! Vision pipeline — frame acquisition → hand localization → normalization.
//!
//! # Pipeline
//!
//! ```text
//! FrameSource → RgbImage → HandLocalizer → HandBox
//!            → expand + clamp → aspect-preserving resize → white canvas
//! ```
//!
//! The normalized square canvas is what the gesture classifier consumes.

pub mod capture;
pub mod detect;
pub mod normalize;

pub use capture::{CaptureError, FrameDirSource, FrameSource, NullFrameSource};
pub use detect::{HandBox, HandLocalizer, SkinLocalizer};
pub use normalize::{expand_and_clamp, normalize_hand, CropRegion};

#[cfg(feature = "camera")]
pub use capture::CameraSource;
