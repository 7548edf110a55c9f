//! Image preprocessing ahead of recognition.
//!
//! None of these steps change geometry, so word boxes found in the prepared
//! image are valid in the original band.

use image::{DynamicImage, GrayImage};

/// Share of pixels clipped at each end of the histogram when stretching.
const CLIP_FRACTION: u64 = 100;

/// Grayscale, contrast-normalize and sharpen an image for OCR.
pub fn prepare_for_ocr(image: &DynamicImage) -> DynamicImage {
    let mut gray = image.to_luma8();
    normalize_contrast(&mut gray);
    DynamicImage::ImageLuma8(gray).unsharpen(1.0, 1)
}

/// Stretch luminance so the 1st and 99th percentiles map to black and white.
///
/// Images with a flat histogram are left untouched.
pub fn normalize_contrast(image: &mut GrayImage) {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return;
    }

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let cutoff = total / CLIP_FRACTION;

    let mut low = 0u8;
    let mut seen = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        seen += count;
        if seen > cutoff {
            low = value as u8;
            break;
        }
    }

    let mut high = 255u8;
    seen = 0;
    for (value, count) in histogram.iter().enumerate().rev() {
        seen += count;
        if seen > cutoff {
            high = value as u8;
            break;
        }
    }

    if high <= low {
        return;
    }

    let range = f32::from(high - low);
    for pixel in image.pixels_mut() {
        let shifted = pixel.0[0].saturating_sub(low);
        let stretched = (f32::from(shifted) * 255.0 / range).round().min(255.0);
        pixel.0[0] = stretched as u8;
    }
}
