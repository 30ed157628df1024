//! Hand-region normalization.
//!
//! The classifier expects a fixed-size square canvas with the hand centered
//! and the background padded white.  Normalization never distorts the
//! subject: the crop is scaled so its longer side fills the canvas and the
//! shorter side is centered with a computed gap.
//!
//! The crop region is the detected hand box expanded by a margin on all
//! sides and **clamped to the frame bounds**; a region that collapses to
//! zero width or height after clamping is rejected and the frame skipped.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use super::detect::HandBox;

/// Canvas background — white, matching the training data.
const CANVAS_FILL: Rgb<u8> = Rgb([255, 255, 255]);

// ---------------------------------------------------------------------------
// CropRegion
// ---------------------------------------------------------------------------

/// A margin-expanded hand box clamped to the frame, ready to crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Expand `hand` by `margin` pixels on all sides and clamp against a
/// `frame_w` × `frame_h` frame.
///
/// Returns `None` when the clamped region is degenerate (zero area), which
/// can only happen for a box lying entirely outside the frame.
pub fn expand_and_clamp(
    hand: HandBox,
    margin: u32,
    frame_w: u32,
    frame_h: u32,
) -> Option<CropRegion> {
    let x0 = hand.x.saturating_sub(margin);
    let y0 = hand.y.saturating_sub(margin);
    let x1 = hand.x.saturating_add(hand.w).saturating_add(margin).min(frame_w);
    let y1 = hand.y.saturating_add(hand.h).saturating_add(margin).min(frame_h);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some(CropRegion {
        x: x0,
        y: y0,
        w: x1 - x0,
        h: y1 - y0,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Scaled dimensions for a `w` × `h` crop fitted into a `size` square.
///
/// The longer side maps exactly to `size`; the shorter side scales by the
/// same factor, rounded up, and is centered with a rounded-up gap.
/// Returns `(scaled_w, scaled_h, gap_x, gap_y)`.
fn fit_dimensions(w: u32, h: u32, size: u32) -> (u32, u32, u32, u32) {
    if h > w {
        let scaled_w = div_ceil(w * size, h).clamp(1, size);
        let gap_x = div_ceil(size - scaled_w, 2);
        (scaled_w, size, gap_x, 0)
    } else {
        let scaled_h = div_ceil(h * size, w).clamp(1, size);
        let gap_y = div_ceil(size - scaled_h, 2);
        (size, scaled_h, 0, gap_y)
    }
}

fn div_ceil(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

/// Crop `region` out of `frame` and render it onto a white `size` × `size`
/// canvas, preserving aspect ratio.
pub fn normalize_to_canvas(frame: &RgbImage, region: CropRegion, size: u32) -> RgbImage {
    let crop = imageops::crop_imm(frame, region.x, region.y, region.w, region.h).to_image();

    let (scaled_w, scaled_h, gap_x, gap_y) = fit_dimensions(region.w, region.h, size);
    let resized = imageops::resize(&crop, scaled_w, scaled_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(size, size, CANVAS_FILL);
    imageops::overlay(&mut canvas, &resized, i64::from(gap_x), i64::from(gap_y));
    canvas
}

/// Full normalization step: expand, clamp, crop and render.
///
/// Returns `None` when the region is degenerate after clamping (the caller
/// skips the frame).
pub fn normalize_hand(
    frame: &RgbImage,
    hand: HandBox,
    margin: u32,
    size: u32,
) -> Option<RgbImage> {
    let region = expand_and_clamp(hand, margin, frame.width(), frame.height())?;
    Some(normalize_to_canvas(frame, region, size))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
