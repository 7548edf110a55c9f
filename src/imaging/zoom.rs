//! Close-up composition around a located year.
//!
//! A fixed 1920x1080 window is cut from the full page around the year,
//! cover-fitted back to exactly 1920x1080 and lightly sharpened. The year's
//! box is remapped through the same geometry so consumers can draw a
//! highlight without redoing any math.

use image::imageops::FilterType;
use image::DynamicImage;

use super::cover::{CoverTransform, Gravity};
use crate::models::{BoundingBox, ZoomCoordinates};

pub const ZOOM_WIDTH: u32 = 1920;
pub const ZOOM_HEIGHT: u32 = 1080;

/// Unsharp-mask sigma applied after resampling.
const ZOOM_SHARPEN_SIGMA: f32 = 0.8;

/// Where to cut and how to resample, computed before touching pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPlan {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// Year box in full-page coordinates.
    pub page_bbox: BoundingBox,
    pub cover: CoverTransform,
    pub coordinates: ZoomCoordinates,
}

/// Rendered close-up and the year's position inside it.
#[derive(Debug, Clone)]
pub struct ZoomImage {
    pub image: DynamicImage,
    pub coordinates: ZoomCoordinates,
}

/// Clamp a window start so `[start, start + size)` stays inside `[0, limit)`.
/// The window is shifted, never shrunk, unless the image itself is smaller.
fn clamp_window(center: f64, size: u32, limit: u32) -> u32 {
    let start = (center - f64::from(size) / 2.0).round() as i64;
    let max_start = (i64::from(limit) - i64::from(size)).max(0);
    start.clamp(0, max_start) as u32
}

/// Compute the zoom geometry for a year box found in the footer band.
///
/// Returns `None` if the translated box is empty or falls outside the page.
pub fn plan_zoom(
    page_width: u32,
    page_height: u32,
    band_origin_y: u32,
    band_bbox: BoundingBox,
) -> Option<ZoomPlan> {
    if page_width == 0 || page_height == 0 {
        return None;
    }

    let page_bbox = band_bbox.translate_y(i32::try_from(band_origin_y).ok()?);
    if !page_bbox.is_valid() || !page_bbox.fits_within(page_width, page_height) {
        return None;
    }

    let (center_x, center_y) = page_bbox.center();
    let left = clamp_window(center_x, ZOOM_WIDTH, page_width);
    let top = clamp_window(center_y, ZOOM_HEIGHT, page_height);
    let width = ZOOM_WIDTH.min(page_width - left);
    let height = ZOOM_HEIGHT.min(page_height - top);

    let cover = CoverTransform::new(width, height, ZOOM_WIDTH, ZOOM_HEIGHT, Gravity::Center);
    let window_bbox = page_bbox.offset(-(left as i32), -(top as i32));
    let coordinates = cover.map_box(window_bbox);

    Some(ZoomPlan {
        left,
        top,
        width,
        height,
        page_bbox,
        cover,
        coordinates,
    })
}

/// Build the close-up image for a year located inside the footer band.
pub fn compose_zoom(
    full: &DynamicImage,
    band_origin_y: u32,
    band_bbox: BoundingBox,
) -> Option<ZoomImage> {
    let Some(plan) = plan_zoom(full.width(), full.height(), band_origin_y, band_bbox) else {
        tracing::warn!(
            "Year box {:?} (band offset {}) is outside the {}x{} page, skipping zoom",
            band_bbox,
            band_origin_y,
            full.width(),
            full.height()
        );
        return None;
    };

    tracing::debug!(
        "Zoom window {}x{} at ({},{}), scale {:.3}",
        plan.width,
        plan.height,
        plan.left,
        plan.top,
        plan.cover.scale
    );

    let window = full.crop_imm(plan.left, plan.top, plan.width, plan.height);
    let framed = plan.cover.apply(&window, FilterType::Lanczos3);
    let image = framed.unsharpen(ZOOM_SHARPEN_SIGMA, 0);

    Some(ZoomImage {
        image,
        coordinates: plan.coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_plan_centers_window_on_year() {
        // 2x capture of a long page, year mid-footer
        let plan = plan_zoom(3840, 8000, 6000, BoundingBox::new(1800, 1000, 1900, 1040)).unwrap();

        assert_eq!(plan.page_bbox, BoundingBox::new(1800, 7000, 1900, 7040));
        assert_eq!((plan.width, plan.height), (1920, 1080));
        assert_eq!(plan.left, 1850 - 960);
        assert_eq!(plan.top, 7020 - 540);
        assert!(plan.cover.is_identity());
        assert_eq!(
            plan.coordinates,
            ZoomCoordinates { x: 910, y: 520, width: 100, height: 40 }
        );
    }

    #[test]
    fn test_plan_shifts_window_at_page_edges() {
        // Year in the bottom-left corner
        let plan = plan_zoom(3840, 8000, 6000, BoundingBox::new(10, 1950, 110, 1990)).unwrap();
        assert_eq!(plan.left, 0);
        assert_eq!(plan.top, 8000 - 1080);
        assert_eq!((plan.width, plan.height), (1920, 1080));
        assert_eq!(plan.coordinates.x, 10);
        assert_eq!(plan.coordinates.y, 7950 - (8000 - 1080));
    }

    #[test]
    fn test_plan_small_page_scales_up() {
        // Page narrower and shorter than the window
        let plan = plan_zoom(960, 800, 600, BoundingBox::new(100, 0, 200, 40)).unwrap();
        assert_eq!((plan.left, plan.top), (0, 0));
        assert_eq!((plan.width, plan.height), (960, 800));
        assert!((plan.cover.scale - 2.0).abs() < 1e-9);
        // 960x800 -> 1920x1600, 260px cropped from the top
        assert_eq!(plan.coordinates.x, 200);
        assert_eq!(plan.coordinates.y, 600 * 2 - 260);
        assert_eq!(plan.coordinates.width, 200);
        assert_eq!(plan.coordinates.height, 80);
    }

    #[test]
    fn test_plan_rejects_out_of_bounds_box() {
        assert!(plan_zoom(1920, 1000, 750, BoundingBox::new(0, 240, 50, 260)).is_none());
        assert!(plan_zoom(1920, 1000, 750, BoundingBox::new(50, 10, 50, 20)).is_none());
        assert!(plan_zoom(0, 0, 0, BoundingBox::new(0, 0, 1, 1)).is_none());
    }

    #[test]
    fn test_remapped_coordinates_stay_in_frame() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let page_width = rng.gen_range(200..5000u32);
            let page_height = rng.gen_range(200..20000u32);
            let band_origin = page_height - page_height / 4;
            let band_height = page_height / 4;

            let w = rng.gen_range(1..=page_width.min(300)) as i32;
            let h = rng.gen_range(1..=band_height.clamp(1, 80)) as i32;
            let x0 = rng.gen_range(0..=(page_width as i32 - w));
            let y0 = rng.gen_range(0..=(band_height as i32 - h));

            let plan = plan_zoom(
                page_width,
                page_height,
                band_origin,
                BoundingBox::new(x0, y0, x0 + w, y0 + h),
            )
            .unwrap();

            let c = plan.coordinates;
            assert!(c.x >= 0 && c.y >= 0);
            assert!(c.x + c.width <= ZOOM_WIDTH as i32);
            assert!(c.y + c.height <= ZOOM_HEIGHT as i32);
        }
    }

    #[test]
    fn test_full_window_keeps_whole_box_visible() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let x0 = rng.gen_range(0..3700);
            let y0 = rng.gen_range(0..1950);
            let bbox = BoundingBox::new(x0, y0, x0 + 120, y0 + 40);
            let plan = plan_zoom(3840, 8000, 6000, bbox).unwrap();

            assert_eq!(plan.coordinates.width, 120);
            assert_eq!(plan.coordinates.height, 40);
        }
    }

    #[test]
    fn test_compose_zoom_output_size() {
        let full = DynamicImage::new_rgb8(2400, 2000);
        let zoom = compose_zoom(&full, 1500, BoundingBox::new(1000, 300, 1100, 340)).unwrap();
        assert_eq!((zoom.image.width(), zoom.image.height()), (ZOOM_WIDTH, ZOOM_HEIGHT));
    }
}
