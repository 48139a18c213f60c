//! Session bindings.
//!
//! The host supplies the encoder and uploader as synchronous JS callbacks.
//! Returning a Promise from a callback is not supported: the session
//! exports strictly one asset after another and needs each result before
//! moving on.
//!
//! # Encoder callbacks
//!
//! ```typescript
//! const encoder = new JsCropEncoder(
//!   (uri) => ({ width, height }),
//!   (uri, rect, targetWidth) => ({ uri: outUri, width, height }),
//! );
//! ```

use cropframe_core::session::{
    open_batch_crop, open_single_crop, publish, AssetFailure, AssetSource, BatchSession,
    CancelToken, CropEncoder, CropOutcome, CropResult, DecodeBudget, EncodedAsset,
    FinalizeReport, ImageUploader, Immediate, PresetChange, SessionState, Viewport,
};
use cropframe_core::{AssetDimensions, CropRegion, EncodeError, Point};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::controller::{settled_to_js, tap_label};
use crate::convert::{
    config_from_js, error_kind, from_js, js_error, optional_from_js, parse_preset, to_js,
};

fn callback_error(error: JsValue) -> EncodeError {
    EncodeError::EncodingFailed(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

/// A `CropEncoder` backed by two JS functions.
#[wasm_bindgen]
pub struct JsCropEncoder {
    probe: js_sys::Function,
    encode: js_sys::Function,
}

#[wasm_bindgen]
impl JsCropEncoder {
    /// `probe(uri) -> {width, height}`,
    /// `encode(uri, rect, targetWidth | undefined) -> {uri, width, height}`.
    #[wasm_bindgen(constructor)]
    pub fn new(probe: js_sys::Function, encode: js_sys::Function) -> JsCropEncoder {
        JsCropEncoder { probe, encode }
    }
}

impl CropEncoder for JsCropEncoder {
    fn probe(&self, uri: &str) -> Result<AssetDimensions, EncodeError> {
        let value = self
            .probe
            .call1(&JsValue::NULL, &JsValue::from_str(uri))
            .map_err(callback_error)?;
        serde_wasm_bindgen::from_value(value).map_err(|e| EncodeError::EncodingFailed(e.to_string()))
    }

    fn encode_crop(
        &self,
        uri: &str,
        rect: &CropRegion,
        target_width: Option<u32>,
    ) -> Result<EncodedAsset, EncodeError> {
        let rect = serde_wasm_bindgen::to_value(rect)
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        let target = target_width.map(JsValue::from).unwrap_or(JsValue::UNDEFINED);
        let value = self
            .encode
            .call3(&JsValue::NULL, &JsValue::from_str(uri), &rect, &target)
            .map_err(callback_error)?;
        serde_wasm_bindgen::from_value(value).map_err(|e| EncodeError::EncodingFailed(e.to_string()))
    }
}

/// An `ImageUploader` backed by `upload(uris: string[]) -> string[]`.
struct CallbackUploader<'a>(&'a js_sys::Function);

impl ImageUploader for CallbackUploader<'_> {
    fn upload_images(&self, uris: &[String]) -> Result<Vec<String>, String> {
        let arg = serde_wasm_bindgen::to_value(uris).map_err(|e| e.to_string())?;
        let value = self
            .0
            .call1(&JsValue::NULL, &arg)
            .map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))?;
        serde_wasm_bindgen::from_value(value).map_err(|e| e.to_string())
    }
}

/// Cancellation flag that an encoder callback may trip mid-finalize.
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct JsCancelToken {
    inner: CancelToken,
}

#[wasm_bindgen]
impl JsCancelToken {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsCancelToken {
        JsCancelToken::default()
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

#[derive(Debug, Serialize)]
struct FailureSummary {
    index: usize,
    source_uri: String,
    kind: &'static str,
    message: String,
}

impl From<&AssetFailure> for FailureSummary {
    fn from(failure: &AssetFailure) -> Self {
        FailureSummary {
            index: failure.index,
            source_uri: failure.source_uri.clone(),
            kind: error_kind(&failure.error),
            message: failure.error.to_string(),
        }
    }
}

/// What `finalize` hands back to JS.
#[derive(Debug, Serialize)]
struct FinalizeSummary {
    cancelled: bool,
    complete: bool,
    /// One slot per asset; `None` where the asset failed.
    results: Vec<Option<CropResult>>,
    failures: Vec<FailureSummary>,
}

impl From<CropOutcome<FinalizeReport>> for FinalizeSummary {
    fn from(outcome: CropOutcome<FinalizeReport>) -> Self {
        let report = match outcome {
            CropOutcome::Completed(report) => report,
            CropOutcome::Cancelled => {
                return FinalizeSummary {
                    cancelled: true,
                    complete: false,
                    results: Vec::new(),
                    failures: Vec::new(),
                }
            }
        };
        FinalizeSummary {
            cancelled: false,
            complete: report.is_complete(),
            failures: report.failures().map(FailureSummary::from).collect(),
            results: report.outcomes.into_iter().map(Result::ok).collect(),
        }
    }
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Editing(_) => "editing",
        SessionState::Exporting => "exporting",
        SessionState::Cancelled => "cancelled",
        SessionState::Completed => "completed",
    }
}

/// A single or batch crop session.
#[wasm_bindgen]
pub struct JsBatchSession {
    inner: BatchSession,
}

#[wasm_bindgen]
impl JsBatchSession {
    /// Open a batch over `sources` (`[{ uri, kind: "image" | "video", dimensions? }]`).
    ///
    /// `locked_preset` imposes a hard aspect lock for the whole batch.
    pub fn open_batch(
        sources: JsValue,
        default_preset: &str,
        locked_preset: Option<String>,
        viewport_width: f64,
        viewport_height: f64,
        config: JsValue,
    ) -> Result<JsBatchSession, JsValue> {
        let sources: Vec<AssetSource> = from_js(sources, "sources")?;
        let locked = locked_preset.as_deref().map(parse_preset).transpose()?;
        let inner = open_batch_crop(
            sources,
            parse_preset(default_preset)?,
            locked,
            Viewport::new(viewport_width, viewport_height),
            config_from_js(config)?,
        )
        .map_err(js_error)?;
        Ok(JsBatchSession { inner })
    }

    /// Open a single-asset session, optionally restoring a `saved` transform.
    pub fn open_single(
        source: JsValue,
        preset_key: &str,
        saved: JsValue,
        viewport_width: f64,
        viewport_height: f64,
        config: JsValue,
    ) -> Result<JsBatchSession, JsValue> {
        let source: AssetSource = from_js(source, "source")?;
        let inner = open_single_crop(
            source,
            parse_preset(preset_key)?,
            optional_from_js(saved, "transform")?,
            Viewport::new(viewport_width, viewport_height),
            config_from_js(config)?,
        );
        Ok(JsBatchSession { inner })
    }

    /// `"editing"`, `"exporting"`, `"cancelled"` or `"completed"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_label(self.inner.state()).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn active_index(&self) -> usize {
        self.inner.active_index()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Preset key of the active asset.
    #[wasm_bindgen(getter)]
    pub fn active_preset(&self) -> String {
        self.inner
            .entry(self.inner.active_index())
            .map(|entry| entry.preset_key.as_str().to_string())
            .unwrap_or_default()
    }

    /// Frame of the active asset, `{ width, height }`.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.controller().frame())
    }

    pub fn asset_loaded(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.asset_loaded(width, height).map_err(js_error)
    }

    pub fn switch_to(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.switch_to(index).map_err(js_error)
    }

    /// Returns `false` when the aspect lock ignored the change.
    pub fn set_preset_for_active(&mut self, key: &str) -> Result<bool, JsValue> {
        let change = self
            .inner
            .set_preset_for_active(parse_preset(key)?)
            .map_err(js_error)?;
        Ok(change == PresetChange::Applied)
    }

    pub fn on_pinch_update(&mut self, focal_x: f64, focal_y: f64, scale_delta: f64) {
        self.inner
            .controller_mut()
            .on_pinch_update(Point::new(focal_x, focal_y), scale_delta);
    }

    pub fn on_pinch_end(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.controller_mut().on_pinch_end())
    }

    pub fn on_pan_update(&mut self, dx: f64, dy: f64, pointers: u32) {
        self.inner.controller_mut().on_pan_update(dx, dy, pointers);
    }

    pub fn on_pan_end(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.controller_mut().on_pan_end())
    }

    pub fn on_double_tap(&mut self) -> Result<JsValue, JsValue> {
        settled_to_js(self.inner.controller_mut().on_double_tap())
    }

    pub fn on_tap(&mut self, at_ms: f64) -> String {
        tap_label(self.inner.controller_mut().on_tap(at_ms)).to_string()
    }

    pub fn advance_animation(&mut self, dt_ms: f64) -> Result<JsValue, JsValue> {
        to_js(&self.inner.controller_mut().advance_animation(dt_ms))
    }

    pub fn crop_preview(&self) -> Result<JsValue, JsValue> {
        match self.inner.controller().current_crop_preview() {
            Some(region) => to_js(&region),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn commit_active(&mut self, encoder: &JsCropEncoder) -> Result<JsValue, JsValue> {
        let result = self.inner.commit_active(encoder).map_err(js_error)?;
        to_js(result)
    }

    /// Export every asset in order.
    ///
    /// With `reclaim`, decode buffers are budgeted and the callback is
    /// invoked whenever the host should let memory settle before the next
    /// decode. Per-asset failures are logged to the console and returned in
    /// `failures`.
    pub fn finalize(
        &mut self,
        encoder: &JsCropEncoder,
        cancel: &JsCancelToken,
        reclaim: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let outcome = match reclaim {
            Some(reclaim) => {
                let mut gate = DecodeBudget::from_config(self.inner.config(), || {
                    if let Err(e) = reclaim.call0(&JsValue::NULL) {
                        web_sys::console::warn_1(&e);
                    }
                });
                self.inner.finalize(encoder, &mut gate, &cancel.inner)
            }
            None => self.inner.finalize(encoder, &mut Immediate, &cancel.inner),
        }
        .map_err(js_error)?;

        let summary = FinalizeSummary::from(outcome);
        for failure in &summary.failures {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "cropframe: asset {} ({}) failed: {}",
                failure.index, failure.source_uri, failure.message
            )));
        }
        to_js(&summary)
    }

    /// Complete with the assets exported so far.
    pub fn accept_partial(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.accept_partial().map_err(js_error)?)
    }

    /// Finish a single-asset flow; throws while the asset is invalid.
    ///
    /// Returns `null` if the session was cancelled.
    pub fn finish_single(&mut self, encoder: &JsCropEncoder) -> Result<JsValue, JsValue> {
        match self.inner.finish_single(encoder).map_err(js_error)? {
            CropOutcome::Completed(result) => to_js(&result),
            CropOutcome::Cancelled => Ok(JsValue::NULL),
        }
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

/// Upload exported results; resolves to one URL per result, in order.
///
/// Video results keep their source URI. The uploader is retried up to
/// `attempts` times (default 3) and must tolerate duplicate uploads.
#[wasm_bindgen]
pub fn publish_results(
    uploader: &js_sys::Function,
    results: JsValue,
    attempts: Option<u32>,
) -> Result<JsValue, JsValue> {
    let results: Vec<CropResult> = from_js(results, "results")?;
    let attempts = attempts.unwrap_or_else(|| cropframe_core::CropConfig::default().upload_attempts);
    let urls = publish(&CallbackUploader(uploader), &results, attempts).map_err(js_error)?;
    to_js(&urls)
}
