//! Post-crop downscaling to a preset's export width.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Filter type for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Height that keeps the aspect ratio when `width x height` becomes `target_width` wide.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    ((height as f64 * target_width as f64 / width as f64).round() as u32).max(1)
}

/// Downscale `image` to `target_width`, preserving aspect ratio.
///
/// Never upscales: an image already at or below the target is returned
/// unchanged, as is a zero target.
pub fn scale_to_width(image: &RgbImage, target_width: u32, filter: FilterType) -> RgbImage {
    let (width, height) = image.dimensions();
    if target_width == 0 || width <= target_width {
        return image.clone();
    }

    let target_height = scaled_height(width, height, target_width);
    image::imageops::resize(image, target_width, target_height, filter.to_image_filter())
}
