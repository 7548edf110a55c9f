//! Encodings handed to the dashboard and written to disk.

use image::imageops::FilterType;
use image::DynamicImage;

use super::cover::{CoverTransform, Gravity};
use super::{encode_jpeg, ImageError};

/// Width the full-page screenshot is reduced to before hashing.
pub const PAGE_DISPLAY_WIDTH: u32 = 1920;

/// Stored images are always this frame.
const DISPLAY_FRAME: (u32, u32) = (1920, 1080);
const DISPLAY_QUALITY: u8 = 90;

/// Downscale a page to [`PAGE_DISPLAY_WIDTH`], preserving aspect ratio.
///
/// Pages already at or below the target width are returned unchanged.
pub fn downscale_page(full: &DynamicImage) -> DynamicImage {
    if full.width() <= PAGE_DISPLAY_WIDTH {
        return full.clone();
    }
    let ratio = f64::from(PAGE_DISPLAY_WIDTH) / f64::from(full.width());
    let height = ((f64::from(full.height()) * ratio).round() as u32).max(1);
    full.resize_exact(PAGE_DISPLAY_WIDTH, height, FilterType::Triangle)
}

/// Cover-fit encoded image bytes into the display frame and re-encode as JPEG.
pub fn encode_for_display(bytes: &[u8], gravity: Gravity) -> Result<Vec<u8>, ImageError> {
    let image = super::decode(bytes)?;
    let (width, height) = DISPLAY_FRAME;
    let cover = CoverTransform::new(image.width(), image.height(), width, height, gravity);
    let framed = cover.apply(&image, FilterType::Lanczos3);
    encode_jpeg(&framed, DISPLAY_QUALITY)
}
