//! Pixel-space rectangles shared by the OCR, scoring and zoom stages.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates, `x1`/`y1` exclusive.
///
/// The coordinate space depends on who produced it: boxes coming out of the
/// recognizer are local to the image that was recognized (the footer band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// True when the box has a positive area.
    pub fn is_valid(&self) -> bool {
        self.x1 > self.x0 && self.y1 > self.y0
    }

    /// Shift the box vertically. Used to move band-local boxes into
    /// full-page space: `full_y = band_y + origin_y`.
    pub fn translate_y(&self, dy: i32) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0 + dy,
            x1: self.x1,
            y1: self.y1 + dy,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x0 + self.x1) / 2.0,
            f64::from(self.y0 + self.y1) / 2.0,
        )
    }

    /// Whether the box lies entirely within a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x0 >= 0
            && self.y0 >= 0
            && i64::from(self.x1) <= i64::from(width)
            && i64::from(self.y1) <= i64::from(height)
    }
}

/// Position of the detected year inside the delivered zoom image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomCoordinates {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}
