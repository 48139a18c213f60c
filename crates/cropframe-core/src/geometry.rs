//! Crop geometry: cover-fit scaling, zoom/pan bounds and crop rectangles.
//!
//! Everything here is a pure function of its arguments. The same numbers that
//! drive the live preview (display-space pan against the cover-scaled asset)
//! are reused verbatim to compute the export rectangle, so preview and export
//! cannot disagree.
//!
//! # Coordinate Spaces
//!
//! - **Display space**: on-screen units. The frame is `frame.width x frame.height`,
//!   the asset is drawn centred at `display_width * zoom x display_height * zoom`
//!   and offset by `(pan_x, pan_y)`. Positive pan moves the asset right/down.
//! - **Source space**: pixels of the decoded asset. Origin is top-left.
//!
//! # Mapping
//!
//! The frame's top-left corner in the coordinates of the displayed asset is
//!
//! ```text
//! frame_origin_in_displayed = (displayed_size - frame_size) / 2 - pan
//! ```
//!
//! and dividing by `displayed_size / asset_size` converts it to source pixels.

use serde::{Deserialize, Serialize};

use crate::error::CropError;

/// Natural size of a source asset in pixels.
///
/// `0x0` means the asset has not been loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetDimensions {
    pub width: u32,
    pub height: u32,
}

impl AssetDimensions {
    /// Sentinel for an asset whose dimensions are not known yet.
    pub const UNLOADED: AssetDimensions = AssetDimensions {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_loaded(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Peak bytes held while decoding the asset upright.
    ///
    /// The decoder's own buffer (up to 4 bytes per pixel for RGBA sources)
    /// and the RGB8 copy it is converted into (3 bytes per pixel) are alive
    /// together, so both are counted.
    pub fn decoded_bytes(self) -> u64 {
        (self.width as u64 * self.height as u64).saturating_mul(4 + 3)
    }
}

/// The fixed-aspect viewport the user crops against, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width divided by height; 0 for an empty frame.
    pub fn aspect(self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width / self.height
        }
    }
}

/// How an asset is currently framed.
///
/// `zoom` and the pans are user-controlled; the display/frame sizes are the
/// cover-fit context captured when the asset loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Multiplier over the cover-fit scale, `>= 1` once settled.
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Asset width once scaled to cover the frame at `zoom = 1`.
    pub display_width: f64,
    /// Asset height once scaled to cover the frame at `zoom = 1`.
    pub display_height: f64,
    pub frame_width: f64,
    pub frame_height: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            display_width: 0.0,
            display_height: 0.0,
            frame_width: 0.0,
            frame_height: 0.0,
        }
    }
}

impl Transform {
    /// Cover-fit transform at `zoom = 1` with no pan.
    pub fn cover(asset: AssetDimensions, frame: Frame) -> Self {
        let scale = cover_fit_scale(
            asset.width as f64,
            asset.height as f64,
            frame.width,
            frame.height,
        );
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            display_width: asset.width as f64 * scale,
            display_height: asset.height as f64 * scale,
            frame_width: frame.width,
            frame_height: frame.height,
        }
    }

    pub fn frame(&self) -> Frame {
        Frame::new(self.frame_width, self.frame_height)
    }

    /// Whether the cover-fit context has been captured.
    pub fn has_context(&self) -> bool {
        self.display_width > 0.0 && self.display_height > 0.0 && !self.frame().is_empty()
    }

    /// Largest allowed `|pan_x|` and `|pan_y|` at the current zoom.
    pub fn max_pan(&self) -> (f64, f64) {
        (
            ((self.display_width * self.zoom - self.frame_width) / 2.0).max(0.0),
            ((self.display_height * self.zoom - self.frame_height) / 2.0).max(0.0),
        )
    }

    /// Copy with `zoom` clamped to `[1, max_zoom]`.
    pub fn clamp_zoom(self, max_zoom: f64) -> Self {
        Self {
            zoom: self.zoom.clamp(1.0, max_zoom.max(1.0)),
            ..self
        }
    }

    /// Copy with the pans clamped to the limits of the current zoom.
    pub fn clamp_pan(self) -> Self {
        let (max_x, max_y) = self.max_pan();
        Self {
            pan_x: self.pan_x.clamp(-max_x, max_x),
            pan_y: self.pan_y.clamp(-max_y, max_y),
            ..self
        }
    }

    /// Settled form: zoom clamped first, then pan against the settled zoom.
    pub fn settle(self, max_zoom: f64) -> Self {
        self.clamp_zoom(max_zoom).clamp_pan()
    }

    /// Linear blend between two transforms sharing the same context.
    pub fn lerp(self, to: Transform, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            zoom: mix(self.zoom, to.zoom),
            pan_x: mix(self.pan_x, to.pan_x),
            pan_y: mix(self.pan_y, to.pan_y),
            ..to
        }
    }
}

/// Zoom and pan limits for an asset inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleBounds {
    /// Cover-fit scale (zoom = 1).
    pub min_scale: f64,
    /// `min_scale * max_zoom`.
    pub max_scale: f64,
    /// Largest `|pan_x|` at the given zoom.
    pub max_pan_x: f64,
    /// Largest `|pan_y|` at the given zoom.
    pub max_pan_y: f64,
}

/// A rectangle of source pixels to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// The whole asset.
    pub fn full(asset: AssetDimensions) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width: asset.width,
            height: asset.height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Whether the region lies within `asset` and is non-degenerate.
    pub fn fits(&self, asset: AssetDimensions) -> bool {
        self.width > 0
            && self.height > 0
            && self.origin_x as u64 + self.width as u64 <= asset.width as u64
            && self.origin_y as u64 + self.height as u64 <= asset.height as u64
    }
}

/// Scale at which an asset exactly covers a frame with no gaps.
///
/// Returns `max(frame_w / asset_w, frame_h / asset_h)`, or 0 when any
/// dimension is non-positive.
#[inline]
pub fn cover_fit_scale(asset_w: f64, asset_h: f64, frame_w: f64, frame_h: f64) -> f64 {
    if asset_w <= 0.0 || asset_h <= 0.0 || frame_w <= 0.0 || frame_h <= 0.0 {
        return 0.0;
    }
    (frame_w / asset_w).max(frame_h / asset_h)
}

/// Compute scale and pan limits for the given zoom.
///
/// Pan limits follow the *current* scaled size, so they shrink as zoom
/// decreases. Degenerate inputs (any dimension `<= 0`) produce an all-zero
/// result; callers must not run gesture math against unloaded assets.
pub fn scale_and_pan_bounds(
    asset_w: f64,
    asset_h: f64,
    frame_w: f64,
    frame_h: f64,
    zoom: f64,
    max_zoom: f64,
) -> ScaleBounds {
    let min_scale = cover_fit_scale(asset_w, asset_h, frame_w, frame_h);
    if min_scale <= 0.0 {
        return ScaleBounds::default();
    }

    let scale = min_scale * zoom;
    ScaleBounds {
        min_scale,
        max_scale: min_scale * max_zoom,
        max_pan_x: ((asset_w * scale - frame_w) / 2.0).max(0.0),
        max_pan_y: ((asset_h * scale - frame_h) / 2.0).max(0.0),
    }
}

/// Map a transform to the source-pixel rectangle visible inside the frame.
///
/// The result is clamped into the asset: origin into `[0, size - 1]`, size so
/// that `origin + size <= asset size`, with a floor of one pixel. The
/// function is deterministic; identical inputs give identical output.
///
/// An unloaded asset yields an empty region and an empty frame the full
/// asset; callers treat both as "pass the asset through unmodified".
pub fn crop_region(asset: AssetDimensions, frame: Frame, transform: &Transform) -> CropRegion {
    if !asset.is_loaded() || frame.is_empty() {
        return CropRegion::full(asset);
    }

    let asset_w = asset.width as f64;
    let asset_h = asset.height as f64;

    // Fall back to a fresh cover fit when the load-time context is missing.
    let (display_w, display_h) = if transform.display_width > 0.0 && transform.display_height > 0.0
    {
        (transform.display_width, transform.display_height)
    } else {
        let scale = cover_fit_scale(asset_w, asset_h, frame.width, frame.height);
        (asset_w * scale, asset_h * scale)
    };
    let zoom = if transform.zoom > 0.0 { transform.zoom } else { 1.0 };

    let displayed_w = display_w * zoom;
    let displayed_h = display_h * zoom;

    let origin_in_displayed_x = (displayed_w - frame.width) / 2.0 - transform.pan_x;
    let origin_in_displayed_y = (displayed_h - frame.height) / 2.0 - transform.pan_y;

    let ratio_x = displayed_w / asset_w;
    let ratio_y = displayed_h / asset_h;

    let origin_x = clamp_origin(origin_in_displayed_x / ratio_x, asset.width);
    let origin_y = clamp_origin(origin_in_displayed_y / ratio_y, asset.height);
    let width = clamp_extent(frame.width / ratio_x, origin_x, asset.width);
    let height = clamp_extent(frame.height / ratio_y, origin_y, asset.height);

    CropRegion {
        origin_x,
        origin_y,
        width,
        height,
    }
}

fn clamp_origin(value: f64, limit: u32) -> u32 {
    let max = limit.saturating_sub(1) as f64;
    value.round().clamp(0.0, max) as u32
}

fn clamp_extent(value: f64, origin: u32, limit: u32) -> u32 {
    let available = limit.saturating_sub(origin) as f64;
    value.round().clamp(1.0, available.max(1.0)) as u32
}

/// Reject source assets smaller than a preset's minimum.
///
/// Checked once when the asset loads, never per gesture frame.
pub fn validate_minimum_size(
    asset_w: u32,
    asset_h: u32,
    min_w: u32,
    min_h: u32,
) -> Result<(), CropError> {
    if asset_w < min_w || asset_h < min_h {
        return Err(CropError::AssetTooSmall {
            width: asset_w,
            height: asset_h,
            min_width: min_w,
            min_height: min_h,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(asset: AssetDimensions, frame: Frame, zoom: f64, pan: (f64, f64)) -> Transform {
        Transform {
            zoom,
            pan_x: pan.0,
            pan_y: pan.1,
            ..Transform::cover(asset, frame)
        }
    }

    #[test]
    fn test_cover_fit_scale_picks_larger_ratio() {
        assert_eq!(cover_fit_scale(2000.0, 2000.0, 400.0, 500.0), 0.25);
        assert_eq!(cover_fit_scale(1000.0, 500.0, 100.0, 100.0), 0.2);
    }

    #[test]
    fn test_cover_fit_scale_degenerate() {
        assert_eq!(cover_fit_scale(0.0, 100.0, 100.0, 100.0), 0.0);
        assert_eq!(cover_fit_scale(100.0, 100.0, 100.0, -1.0), 0.0);
    }

    #[test]
    fn test_matching_ratio_crops_whole_image() {
        let asset = AssetDimensions::new(1200, 1500);
        let frame = Frame::new(400.0, 500.0);
        let t = transform(asset, frame, 1.0, (0.0, 0.0));

        let scale = cover_fit_scale(1200.0, 1500.0, 400.0, 500.0);
        assert!((scale - 1.0 / 3.0).abs() < 1e-9);

        assert_eq!(
            crop_region(asset, frame, &t),
            CropRegion {
                origin_x: 0,
                origin_y: 0,
                width: 1200,
                height: 1500,
            }
        );
    }

    #[test]
    fn test_square_asset_in_portrait_frame() {
        let asset = AssetDimensions::new(2000, 2000);
        let frame = Frame::new(400.0, 500.0);
        let t = transform(asset, frame, 1.0, (0.0, 0.0));

        assert_eq!(t.display_width, 500.0);
        assert_eq!(t.display_height, 500.0);

        // Horizontal centre crop: 2000 * 4/5 = 1600 wide.
        let region = crop_region(asset, frame, &t);
        assert_eq!(
            region,
            CropRegion {
                origin_x: 200,
                origin_y: 0,
                width: 1600,
                height: 2000,
            }
        );
        assert!((region.aspect() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_double_zoom_quarters_area() {
        let asset = AssetDimensions::new(2000, 2000);
        let frame = Frame::new(400.0, 500.0);

        let base = crop_region(asset, frame, &transform(asset, frame, 1.0, (0.0, 0.0)));
        let zoomed = crop_region(asset, frame, &transform(asset, frame, 2.0, (0.0, 0.0)));

        assert_eq!(zoomed.area() * 4, base.area());
        assert_eq!(
            zoomed,
            CropRegion {
                origin_x: 600,
                origin_y: 500,
                width: 800,
                height: 1000,
            }
        );
    }

    #[test]
    fn test_pan_moves_region_opposite() {
        let asset = AssetDimensions::new(2000, 2000);
        let frame = Frame::new(400.0, 500.0);

        // Asset dragged right by its full slack shows its left edge.
        let t = transform(asset, frame, 1.0, (50.0, 0.0));
        assert_eq!(crop_region(asset, frame, &t).origin_x, 0);

        let t = transform(asset, frame, 1.0, (-50.0, 0.0));
        let region = crop_region(asset, frame, &t);
        assert_eq!(region.origin_x + region.width, 2000);
    }

    #[test]
    fn test_unsettled_pan_is_clamped() {
        let asset = AssetDimensions::new(1000, 1000);
        let frame = Frame::new(100.0, 100.0);
        let t = transform(asset, frame, 3.0, (-10_000.0, 10_000.0));

        let region = crop_region(asset, frame, &t);
        assert!(region.fits(asset));
        assert_eq!(region.origin_y, 0);
    }

    #[test]
    fn test_missing_context_recomputes_cover() {
        let asset = AssetDimensions::new(2000, 2000);
        let frame = Frame::new(400.0, 500.0);
        let region = crop_region(asset, frame, &Transform::default());
        assert_eq!(region.width, 1600);
        assert_eq!(region.height, 2000);
    }

    #[test]
    fn test_unloaded_asset_region_is_empty() {
        let region = crop_region(
            AssetDimensions::UNLOADED,
            Frame::new(100.0, 100.0),
            &Transform::default(),
        );
        assert_eq!(region.area(), 0);
    }

    #[test]
    fn test_bounds_shrink_with_zoom() {
        let at_two = scale_and_pan_bounds(2000.0, 2000.0, 400.0, 500.0, 2.0, 5.0);
        let at_one = scale_and_pan_bounds(2000.0, 2000.0, 400.0, 500.0, 1.0, 5.0);

        assert_eq!(at_one.min_scale, 0.25);
        assert_eq!(at_one.max_scale, 1.25);
        assert_eq!(at_one.max_pan_x, 50.0);
        assert_eq!(at_one.max_pan_y, 0.0);
        assert_eq!(at_two.max_pan_x, 300.0);
        assert_eq!(at_two.max_pan_y, 250.0);
    }

    #[test]
    fn test_bounds_degenerate_is_zero() {
        let bounds = scale_and_pan_bounds(0.0, 0.0, 400.0, 500.0, 1.0, 5.0);
        assert_eq!(bounds, ScaleBounds::default());
    }

    #[test]
    fn test_transform_settle_order() {
        let asset = AssetDimensions::new(2000, 2000);
        let frame = Frame::new(400.0, 500.0);
        // Pan valid at zoom 6 but not at the settled zoom 5.
        let t = transform(asset, frame, 6.0, (1200.0, 0.0)).settle(5.0);
        assert_eq!(t.zoom, 5.0);
        assert_eq!(t.pan_x, (2500.0 - 400.0) / 2.0);
    }

    #[test]
    fn test_decoded_bytes_counts_both_buffers() {
        assert_eq!(AssetDimensions::new(2000, 2000).decoded_bytes(), 28_000_000);
        assert_eq!(AssetDimensions::new(0, 100).decoded_bytes(), 0);
        assert_eq!(AssetDimensions::new(u32::MAX, u32::MAX).decoded_bytes(), u64::MAX);
    }

    #[test]
    fn test_validate_minimum_size() {
        assert!(validate_minimum_size(320, 400, 320, 400).is_ok());
        assert!(matches!(
            validate_minimum_size(319, 400, 320, 400),
            Err(CropError::AssetTooSmall { width: 319, .. })
        ));
        assert!(validate_minimum_size(1000, 399, 320, 400).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn asset_strategy() -> impl Strategy<Value = AssetDimensions> {
        (200u32..=4000, 200u32..=4000).prop_map(|(w, h)| AssetDimensions::new(w, h))
    }

    fn frame_strategy() -> impl Strategy<Value = Frame> {
        (100.0f64..=800.0, 100.0f64..=800.0).prop_map(|(w, h)| Frame::new(w, h))
    }

    /// A settled transform: zoom within range, pan as a fraction of its limit.
    fn settled(asset: AssetDimensions, frame: Frame, zoom: f64, fx: f64, fy: f64) -> Transform {
        let base = Transform {
            zoom,
            ..Transform::cover(asset, frame)
        };
        let (max_x, max_y) = base.max_pan();
        Transform {
            pan_x: max_x * fx,
            pan_y: max_y * fy,
            ..base
        }
    }

    proptest! {
        /// Property: The cover-fit scale never leaves gaps.
        #[test]
        fn prop_cover_guarantee(
            asset in asset_strategy(),
            frame in frame_strategy(),
        ) {
            let s = cover_fit_scale(asset.width as f64, asset.height as f64, frame.width, frame.height);
            prop_assert!(s * asset.width as f64 >= frame.width - 1e-9);
            prop_assert!(s * asset.height as f64 >= frame.height - 1e-9);
        }

        /// Property: Crop regions always lie within the asset.
        #[test]
        fn prop_region_within_bounds(
            asset in asset_strategy(),
            frame in frame_strategy(),
            zoom in 1.0f64..=5.0,
            fx in -1.0f64..=1.0,
            fy in -1.0f64..=1.0,
        ) {
            let region = crop_region(asset, frame, &settled(asset, frame, zoom, fx, fy));
            prop_assert!(region.fits(asset), "{:?} outside {:?}", region, asset);
        }

        /// Property: Extreme pan at max zoom stays in bounds.
        #[test]
        fn prop_extreme_pan_within_bounds(
            asset in asset_strategy(),
            frame in frame_strategy(),
            sx in prop::sample::select(vec![-1.0f64, 1.0]),
            sy in prop::sample::select(vec![-1.0f64, 1.0]),
        ) {
            let region = crop_region(asset, frame, &settled(asset, frame, 5.0, sx, sy));
            prop_assert!(region.fits(asset));
        }

        /// Property: Crop rectangles keep the frame's aspect ratio.
        #[test]
        fn prop_region_preserves_frame_aspect(
            asset in asset_strategy(),
            frame in frame_strategy(),
            zoom in 1.0f64..=5.0,
            fx in -1.0f64..=1.0,
            fy in -1.0f64..=1.0,
        ) {
            let region = crop_region(asset, frame, &settled(asset, frame, zoom, fx, fy));
            let expected = frame.aspect();
            // One pixel of rounding on each side of each axis.
            let tolerance = expected * (2.0 / region.width as f64 + 2.0 / region.height as f64);
            prop_assert!(
                (region.aspect() - expected).abs() <= tolerance,
                "aspect {} vs frame {} ({:?})",
                region.aspect(),
                expected,
                region
            );
        }

        /// Property: crop_region is deterministic.
        #[test]
        fn prop_region_is_deterministic(
            asset in asset_strategy(),
            frame in frame_strategy(),
            zoom in 1.0f64..=5.0,
            fx in -1.0f64..=1.0,
            fy in -1.0f64..=1.0,
        ) {
            let t = settled(asset, frame, zoom, fx, fy);
            prop_assert_eq!(crop_region(asset, frame, &t), crop_region(asset, frame, &t));
        }

        /// Property: At zero pan, more zoom means a strictly smaller region.
        #[test]
        fn prop_zoom_shrinks_area(
            asset in (400u32..=4000, 400u32..=4000).prop_map(|(w, h)| AssetDimensions::new(w, h)),
            frame in frame_strategy(),
            zoom in 1.0f64..=2.5,
        ) {
            let near = crop_region(asset, frame, &settled(asset, frame, zoom, 0.0, 0.0));
            let far = crop_region(asset, frame, &settled(asset, frame, zoom + 0.5, 0.0, 0.0));
            prop_assert!(far.area() < near.area(), "{:?} !< {:?}", far, near);
        }

        /// Property: Pan limits never increase as zoom decreases.
        #[test]
        fn prop_pan_limits_monotonic(
            asset in asset_strategy(),
            frame in frame_strategy(),
            zoom in 1.0f64..=4.0,
        ) {
            let w = asset.width as f64;
            let h = asset.height as f64;
            let low = scale_and_pan_bounds(w, h, frame.width, frame.height, zoom, 5.0);
            let high = scale_and_pan_bounds(w, h, frame.width, frame.height, zoom + 1.0, 5.0);
            prop_assert!(low.max_pan_x <= high.max_pan_x);
            prop_assert!(low.max_pan_y <= high.max_pan_y);
        }
    }
}
