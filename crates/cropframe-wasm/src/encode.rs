//! Byte-level crop bindings.
//!
//! Browser hosts have no file system, so instead of `FileCropEncoder` they
//! hand the source file's bytes to `crop_image_bytes` from inside their
//! `JsCropEncoder` callback and store the returned JPEG themselves.
//!
//! # Example
//!
//! ```typescript
//! const encoder = new JsCropEncoder(
//!   (uri) => probe_image_dimensions(files.get(uri)),
//!   (uri, rect, targetWidth) => {
//!     const jpeg = crop_image_bytes(files.get(uri), rect.origin_x, rect.origin_y,
//!                                   rect.width, rect.height, targetWidth, 90);
//!     return store(jpeg);
//!   },
//! );
//! ```

use cropframe_core::decode::{decode_oriented, probe_dimensions};
use cropframe_core::encode::encode_jpeg;
use cropframe_core::transform::{extract_region, scale_to_width, FilterType};
use cropframe_core::{CropRegion, EncodeError};
use wasm_bindgen::prelude::*;

use crate::convert::{js_error, to_js};

fn crop_bytes(
    bytes: &[u8],
    region: &CropRegion,
    target_width: Option<u32>,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let decoded = decode_oriented(bytes)?;
    let cropped = extract_region(&decoded, region);
    drop(decoded);

    let output = match target_width {
        Some(width) => scale_to_width(&cropped, width, FilterType::Lanczos3),
        None => cropped,
    };
    encode_jpeg(&output, quality)
}

/// Crop an encoded image (JPEG/PNG, EXIF orientation honored) and return JPEG bytes.
///
/// The rectangle is in upright source pixels, as produced by the session.
/// When `target_width` is given and the crop is wider, it is downscaled
/// after cropping.
#[wasm_bindgen]
pub fn crop_image_bytes(
    bytes: &[u8],
    origin_x: u32,
    origin_y: u32,
    width: u32,
    height: u32,
    target_width: Option<u32>,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    let region = CropRegion {
        origin_x,
        origin_y,
        width,
        height,
    };
    crop_bytes(bytes, &region, target_width, quality).map_err(js_error)
}

/// Upright `{ width, height }` of an encoded image, from its header.
#[wasm_bindgen]
pub fn probe_image_dimensions(bytes: &[u8]) -> Result<JsValue, JsValue> {
    to_js(&probe_dimensions(bytes).map_err(js_error)?)
}
