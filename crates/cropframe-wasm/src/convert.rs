//! Conversions between JS values and core types.

use std::fmt::Display;

use cropframe_core::{CropConfig, CropError, PresetKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub(crate) fn js_error(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

/// `undefined`/`null` map to `None`.
pub(crate) fn optional_from_js<T: DeserializeOwned>(
    value: JsValue,
    what: &str,
) -> Result<Option<T>, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(None)
    } else {
        from_js(value, what).map(Some)
    }
}

/// A partial config object is filled from defaults; `undefined` means all defaults.
pub(crate) fn config_from_js(value: JsValue) -> Result<CropConfig, JsValue> {
    Ok(optional_from_js(value, "config")?.unwrap_or_default())
}

pub(crate) fn parse_preset(key: &str) -> Result<PresetKey, JsValue> {
    key.parse::<PresetKey>().map_err(js_error)
}

/// Stable, machine-readable name for an error, for UI branching.
pub(crate) fn error_kind(error: &CropError) -> &'static str {
    match error {
        CropError::AssetTooSmall { .. } => "asset_too_small",
        CropError::AssetUnloadable { .. } => "asset_unloadable",
        CropError::EncodeFailure { .. } => "encode_failure",
        CropError::UnknownPreset(_) => "unknown_preset",
        CropError::IndexOutOfRange { .. } => "index_out_of_range",
        CropError::EmptyBatch => "empty_batch",
        CropError::SessionClosed { .. } => "session_closed",
        CropError::UploadFailure(_) => "upload_failure",
    }
}
