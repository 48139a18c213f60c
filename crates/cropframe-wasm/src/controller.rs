//! Transform controller bindings.
//!
//! `JsTransformController` drives one asset outside a session, e.g. an
//! avatar editor. Gesture handlers take raw numbers so they can be called at
//! pointer-event frequency without allocating JS objects; transforms come
//! back as plain objects only where the caller needs one.

use cropframe_core::controller::TapOutcome;
use cropframe_core::preset::preset;
use cropframe_core::{CropConfig, Point, Transform, TransformController};
use wasm_bindgen::prelude::*;

use crate::convert::{config_from_js, js_error, optional_from_js, parse_preset, to_js};

/// Settled target as a JS object, or `null` when the asset is not loaded.
pub(crate) fn settled_to_js(target: Option<Transform>) -> Result<JsValue, JsValue> {
    match target {
        Some(transform) => to_js(&transform),
        None => Ok(JsValue::NULL),
    }
}

pub(crate) fn tap_label(outcome: TapOutcome) -> &'static str {
    match outcome {
        TapOutcome::Pending => "pending",
        TapOutcome::DoubleTap => "double_tap",
        TapOutcome::Ignored => "ignored",
    }
}

/// A gesture controller for a single asset.
#[wasm_bindgen]
pub struct JsTransformController {
    inner: TransformController,
    viewport_width: f64,
    viewport_height: f64,
    config: CropConfig,
}

#[wasm_bindgen]
impl JsTransformController {
    /// Create a controller for `uri` framed by preset `key` inside a viewport.
    #[wasm_bindgen(constructor)]
    pub fn new(
        uri: String,
        key: &str,
        viewport_width: f64,
        viewport_height: f64,
        config: JsValue,
    ) -> Result<JsTransformController, JsValue> {
        let config = config_from_js(config)?;
        let p = preset(parse_preset(key)?);
        let frame = p.frame_for_viewport(
            viewport_width,
            viewport_height,
            config.max_frame_height_fraction,
        );
        Ok(JsTransformController {
            inner: TransformController::new(uri, p, frame, &config),
            viewport_width,
            viewport_height,
            config,
        })
    }

    /// Report the asset's natural size; `saved` optionally restores a transform.
    ///
    /// Throws the user-facing message when the asset is too small.
    pub fn on_asset_loaded(&mut self, width: u32, height: u32, saved: JsValue) -> Result<(), JsValue> {
        let saved = optional_from_js(saved, "transform")?;
        self.inner
            .on_asset_loaded(width, height, saved)
            .map_err(js_error)
    }

    /// Reframe for another preset; zoom and pan reset.
    pub fn set_preset(&mut self, key: &str) -> Result<(), JsValue> {
        let p = preset(parse_preset(key)?);
        let frame = p.frame_for_viewport(
            self.viewport_width,
            self.viewport_height,
            self.config.max_frame_height_fraction,
        );
        self.inner.set_frame(p, frame).map_err(js_error)
    }

    pub fn on_pinch_update(&mut self, focal_x: f64, focal_y: f64, scale_delta: f64) {
        self.inner
            .on_pinch_update(Point::new(focal_x, focal_y), scale_delta);
    }

    pub fn on_pinch_end(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.on_pinch_end())
    }

    pub fn on_pan_update(&mut self, dx: f64, dy: f64, pointers: u32) {
        self.inner.on_pan_update(dx, dy, pointers);
    }

    pub fn on_pan_end(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.on_pan_end())
    }

    pub fn on_double_tap(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.on_double_tap())
    }

    /// Feed a raw tap; returns `"pending"`, `"double_tap"` or `"ignored"`.
    pub fn on_tap(&mut self, at_ms: f64) -> String {
        tap_label(self.inner.on_tap(at_ms)).to_string()
    }

    /// Step the settle animation by `dt_ms`; returns the transform to draw.
    pub fn advance_animation(&mut self, dt_ms: f64) -> Result<JsValue, JsValue> {
        to_js(&self.inner.advance_animation(dt_ms))
    }

    /// The reported (settled after release) transform.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.transform())
    }

    /// Bumped on every transform write; lets a render loop skip unchanged frames.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.inner.cell().revision() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    #[wasm_bindgen(getter)]
    pub fn is_animating(&self) -> bool {
        self.inner.is_animating()
    }

    /// Crop rectangle of the reported transform, `null` while unloaded.
    pub fn crop_preview(&self) -> Result<JsValue, JsValue> {
        match self.inner.current_crop_preview() {
            Some(region) => to_js(&region),
            None => Ok(JsValue::NULL),
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn controller() -> JsTransformController {
        JsTransformController::new(
            "file:///a.jpg".to_string(),
            "feed_portrait",
            400.0,
            1000.0,
            JsValue::UNDEFINED,
        )
        .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_unloaded_controller_has_no_preview() {
        let c = controller();
        assert!(!c.is_loaded());
        assert!(c.crop_preview().unwrap().is_null());
    }

    #[wasm_bindgen_test]
    fn test_double_tap_zooms() {
        let mut c = controller();
        c.on_asset_loaded(2000, 2000, JsValue::UNDEFINED).unwrap();
        let target: Transform = serde_wasm_bindgen::from_value(c.on_double_tap().unwrap()).unwrap();
        assert_eq!(target.zoom, 1.5);
    }

    #[wasm_bindgen_test]
    fn test_too_small_throws() {
        let mut c = controller();
        assert!(c.on_asset_loaded(100, 100, JsValue::UNDEFINED).is_err());
    }
}
