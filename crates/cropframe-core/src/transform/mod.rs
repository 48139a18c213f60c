//! Pixel operations behind an export: crop, then downscale.
//!
//! # Order
//!
//! The crop rectangle is always computed against, and extracted from, the
//! full-resolution source. Downscaling to the preset's export width happens
//! afterwards and only when the crop is wider than that width.
//!
//! # Coordinate System
//!
//! - Regions are in source pixels (see `geometry::CropRegion`)
//! - Origin is top-left corner

mod crop;
mod resize;

pub use crop::extract_region;
pub use resize::{scale_to_width, scaled_height, FilterType};
