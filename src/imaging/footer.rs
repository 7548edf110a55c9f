//! Footer band isolation.

use image::DynamicImage;

/// Share of page height treated as the footer, taken from the bottom.
pub const FOOTER_FRACTION: f64 = 0.25;

/// Bottom slice of a captured page.
#[derive(Debug, Clone)]
pub struct FooterBand {
    pub image: DynamicImage,
    /// Row of the full image where the band's top edge sits.
    /// `origin_y + image.height() == full_height` always holds.
    pub origin_y: u32,
}

impl FooterBand {
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }
}

/// Compute `(origin_y, band_height)` for a page of `height` pixels.
pub fn footer_geometry(height: u32) -> (u32, u32) {
    let band_height = (f64::from(height) * FOOTER_FRACTION).floor() as u32;
    (height - band_height, band_height)
}

/// Crop the bottom quarter of the page.
///
/// Returns `None` when the image has no usable area, which callers treat as
/// a page without a recoverable footer.
pub fn extract_footer_band(full: &DynamicImage) -> Option<FooterBand> {
    let (width, height) = (full.width(), full.height());
    if width == 0 || height == 0 {
        return None;
    }

    let (origin_y, band_height) = footer_geometry(height);
    if band_height == 0 {
        return None;
    }

    tracing::debug!(
        "Footer region: {}x{} from y={}",
        width,
        band_height,
        origin_y
    );

    Some(FooterBand {
        image: full.crop_imm(0, origin_y, width, band_height),
        origin_y,
    })
}
