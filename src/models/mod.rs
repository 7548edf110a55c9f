//! Data models for copyrot.

mod geometry;
mod site;

pub use geometry::{BoundingBox, ZoomCoordinates};
pub use site::{SiteRecord, SiteStatus};
