//! "Cover" resizing: scale until the frame is filled, then crop the overflow.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::models::{BoundingBox, ZoomCoordinates};

/// Which part of the scaled image survives the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Center,
    /// Keep the bottom edge; used for page previews so the footer stays in frame.
    Bottom,
}

/// Geometry of a cover fit from a source size into a target frame.
///
/// The same transform is used to resample pixels and to remap boxes, so a
/// box mapped through [`CoverTransform::map_box`] lands exactly where the
/// pixels it covered end up in [`CoverTransform::apply`]'s output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverTransform {
    pub scale: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
    pub target_width: u32,
    pub target_height: u32,
}

impl CoverTransform {
    /// Plan a cover fit. `source_*` and `target_*` must be non-zero.
    pub fn new(
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        gravity: Gravity,
    ) -> Self {
        let scale_x = f64::from(target_width) / f64::from(source_width);
        let scale_y = f64::from(target_height) / f64::from(source_height);
        let scale = scale_x.max(scale_y);

        let scaled_width = ((f64::from(source_width) * scale).round() as u32).max(target_width);
        let scaled_height = ((f64::from(source_height) * scale).round() as u32).max(target_height);

        let crop_x = (scaled_width - target_width) / 2;
        let crop_y = match gravity {
            Gravity::Center => (scaled_height - target_height) / 2,
            Gravity::Bottom => scaled_height - target_height,
        };

        Self {
            scale,
            scaled_width,
            scaled_height,
            crop_x,
            crop_y,
            target_width,
            target_height,
        }
    }

    /// Whether the transform leaves pixels untouched.
    pub fn is_identity(&self) -> bool {
        self.crop_x == 0
            && self.crop_y == 0
            && self.scaled_width == self.target_width
            && self.scaled_height == self.target_height
            && (self.scale - 1.0).abs() < f64::EPSILON
    }

    /// Resample and crop `image`, which must have the source dimensions.
    pub fn apply(&self, image: &DynamicImage, filter: FilterType) -> DynamicImage {
        if self.is_identity() {
            return image.clone();
        }
        let scaled = if image.width() == self.scaled_width && image.height() == self.scaled_height {
            image.clone()
        } else {
            image.resize_exact(self.scaled_width, self.scaled_height, filter)
        };
        scaled.crop_imm(self.crop_x, self.crop_y, self.target_width, self.target_height)
    }

    /// Map a box from source coordinates into the target frame.
    ///
    /// Boxes are clipped to the frame; whatever part of a box was cropped
    /// away is not visible in the output either.
    pub fn map_box(&self, bbox: BoundingBox) -> ZoomCoordinates {
        let x0 = (f64::from(bbox.x0) * self.scale - f64::from(self.crop_x)).round();
        let y0 = (f64::from(bbox.y0) * self.scale - f64::from(self.crop_y)).round();
        let x1 = x0 + (f64::from(bbox.width()) * self.scale).round();
        let y1 = y0 + (f64::from(bbox.height()) * self.scale).round();

        let max_x = f64::from(self.target_width);
        let max_y = f64::from(self.target_height);
        let cx0 = x0.clamp(0.0, max_x);
        let cy0 = y0.clamp(0.0, max_y);
        let cx1 = x1.clamp(0.0, max_x);
        let cy1 = y1.clamp(0.0, max_y);

        ZoomCoordinates {
            x: cx0 as i32,
            y: cy0 as i32,
            width: (cx1 - cx0) as i32,
            height: (cy1 - cy0) as i32,
        }
    }
}
