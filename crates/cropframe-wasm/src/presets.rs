//! Preset catalog bindings.
//!
//! Presets and frames cross the boundary as plain objects via
//! serde_wasm_bindgen, with snake_case keys matching the Rust fields.

use cropframe_core::preset::{all_presets, preset};
use cropframe_core::Frame;
use wasm_bindgen::prelude::*;

use crate::convert::{config_from_js, parse_preset, to_js};

/// Look up one preset by key (e.g. `"feed_portrait"`).
#[wasm_bindgen]
pub fn get_preset(key: &str) -> Result<JsValue, JsValue> {
    to_js(preset(parse_preset(key)?))
}

/// Every preset, in catalog order.
#[wasm_bindgen]
pub fn list_presets() -> Result<JsValue, JsValue> {
    to_js(all_presets())
}

/// Size of the crop frame for `key` inside a viewport.
///
/// Returns `{ width, height }` in display units. `config` may be a partial
/// object; only `max_frame_height_fraction` is read.
#[wasm_bindgen]
pub fn compute_frame(
    key: &str,
    viewport_width: f64,
    viewport_height: f64,
    config: JsValue,
) -> Result<JsValue, JsValue> {
    let config = config_from_js(config)?;
    let frame: Frame = preset(parse_preset(key)?).frame_for_viewport(
        viewport_width,
        viewport_height,
        config.max_frame_height_fraction,
    );
    to_js(&frame)
}
