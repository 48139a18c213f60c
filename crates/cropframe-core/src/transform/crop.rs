//! Pixel extraction for crop regions.
//!
//! The region is given in source pixels, exactly as produced by
//! `geometry::crop_region`. Out-of-range regions are clamped rather than
//! rejected, and the output is never smaller than 1x1.

use image::RgbImage;

use crate::geometry::CropRegion;

/// Copy the pixels of `region` out of `image`.
///
/// # Behavior
///
/// - The origin is clamped to the last row/column
/// - The extent is clamped to the image edge
/// - Minimum output dimension is 1x1 pixels
/// - The full-image region returns a copy of the original
pub fn extract_region(image: &RgbImage, region: &CropRegion) -> RgbImage {
    let (src_w, src_h) = image.dimensions();

    // Fast path: full crop returns a clone
    if region.origin_x == 0 && region.origin_y == 0 && region.width >= src_w && region.height >= src_h
    {
        return image.clone();
    }

    let x = region.origin_x.min(src_w.saturating_sub(1));
    let y = region.origin_y.min(src_h.saturating_sub(1));
    let width = region.width.min(src_w - x).max(1);
    let height = region.height.min(src_h - y).max(1);

    image::imageops::crop_imm(image, x, y, width, height).to_image()
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn region_strategy() -> impl Strategy<Value = CropRegion> {
        (0u32..=120, 0u32..=120, 0u32..=120, 0u32..=120).prop_map(|(x, y, w, h)| CropRegion {
            origin_x: x,
            origin_y: y,
            width: w,
            height: h,
        })
    }

    proptest! {
        /// Property: Output is non-empty and never larger than the input.
        #[test]
        fn prop_output_bounded(
            (width, height) in (4u32..=100, 4u32..=100),
            region in region_strategy(),
        ) {
            let img = RgbImage::new(width, height);
            let result = extract_region(&img, &region);
            let (w, h) = result.dimensions();

            prop_assert!(w >= 1 && h >= 1);
            prop_assert!(w <= width && h <= height);
        }

        /// Property: A region that fits is extracted at its exact size.
        #[test]
        fn prop_fitting_region_exact(
            (width, height) in (10u32..=100, 10u32..=100),
            fx in 0.0f64..0.5,
            fy in 0.0f64..0.5,
        ) {
            let img = RgbImage::new(width, height);
            let region = CropRegion {
                origin_x: (width as f64 * fx) as u32,
                origin_y: (height as f64 * fy) as u32,
                width: width / 2,
                height: height / 2,
            };
            let result = extract_region(&img, &region);
            prop_assert_eq!(result.dimensions(), (region.width, region.height));
        }
    }
}
