//! Geometry bindings.
//!
//! Stateless helpers for hosts that render their own previews or recompute
//! a stored framing, e.g. a video player reapplying a saved transform.

use cropframe_core::geometry::{scale_and_pan_bounds, validate_minimum_size};
use cropframe_core::preset::preset;
use cropframe_core::{crop_region, AssetDimensions, Transform};
use wasm_bindgen::prelude::*;

use crate::convert::{from_js, js_error, parse_preset, to_js};

/// Source-pixel crop rectangle for `transform` over an asset.
///
/// `transform` is an object as returned by the controller bindings; its
/// cached frame size is the frame the rectangle is computed against.
#[wasm_bindgen]
pub fn compute_crop_region(
    asset_width: u32,
    asset_height: u32,
    transform: JsValue,
) -> Result<JsValue, JsValue> {
    let transform: Transform = from_js(transform, "transform")?;
    let asset = AssetDimensions::new(asset_width, asset_height);
    to_js(&crop_region(asset, transform.frame(), &transform))
}

/// Cover-fit scale and pan limits at `zoom` for an asset in a frame.
#[wasm_bindgen]
pub fn compute_scale_bounds(
    asset_width: f64,
    asset_height: f64,
    frame_width: f64,
    frame_height: f64,
    zoom: f64,
    max_zoom: f64,
) -> Result<JsValue, JsValue> {
    to_js(&scale_and_pan_bounds(
        asset_width,
        asset_height,
        frame_width,
        frame_height,
        zoom,
        max_zoom,
    ))
}

/// Throws the user-facing "too small" message when the asset is below the
/// preset's minimum.
#[wasm_bindgen]
pub fn validate_asset_size(key: &str, width: u32, height: u32) -> Result<(), JsValue> {
    let p = preset(parse_preset(key)?);
    validate_minimum_size(width, height, p.min_width, p.min_height).map_err(js_error)
}
