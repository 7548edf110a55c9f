//! Screenshot image handling: metadata, footer isolation, zoom composition
//! and display encodings.

mod cover;
mod display;
mod footer;
mod zoom;

pub use cover::{CoverTransform, Gravity};
pub use display::{downscale_page, encode_for_display, PAGE_DISPLAY_WIDTH};
pub use footer::{extract_footer_band, FooterBand, FOOTER_FRACTION};
pub use zoom::{compose_zoom, plan_zoom, ZoomImage, ZoomPlan, ZOOM_HEIGHT, ZOOM_WIDTH};

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use thiserror::Error;

/// Widest image accepted for decoding (a 1920 viewport at up to 8x).
pub const MAX_DECODE_WIDTH: u32 = 16_384;
/// Tallest image accepted for decoding. Full-page captures of long pages
/// at 2x run to tens of thousands of pixels.
pub const MAX_DECODE_HEIGHT: u32 = 262_144;

/// Errors from image decoding and encoding.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Could not read image metadata: {0}")]
    Metadata(String),

    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image task failed: {0}")]
    Task(String),
}

/// Pixel dimensions read from an encoded image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Read dimensions from encoded bytes without decoding the pixel data.
pub fn read_dimensions(bytes: &[u8]) -> Result<ImageDimensions, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::Metadata(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(ImageError::Empty { width, height });
    }
    Ok(ImageDimensions { width, height })
}

/// Decoder limits: dimensions are capped, allocation size is not.
///
/// The decoder's default 512 MiB allocation cap rejects ordinary long pages
/// captured at 2x (3840x35000 RGBA is already over it).
pub fn decode_limits() -> Limits {
    let mut limits = Limits::no_limits();
    limits.max_image_width = Some(MAX_DECODE_WIDTH);
    limits.max_image_height = Some(MAX_DECODE_HEIGHT);
    limits
}

/// Decode encoded bytes into an image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(decode_limits());
    let image = reader.decode()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::Empty {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

/// Run CPU-bound image work on the blocking pool.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ImageError>
where
    F: FnOnce() -> Result<T, ImageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ImageError::Task(e.to_string()))?
}

/// Encode as baseline JPEG at the given quality (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&rgb)?;
    Ok(buf)
}

/// Encode as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
