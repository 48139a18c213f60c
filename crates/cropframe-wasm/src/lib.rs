//! Cropframe WASM - WebAssembly bindings for the crop engine
//!
//! This crate exposes cropframe-core to the JavaScript screens that own
//! gestures and rendering.
//!
//! # Module Structure
//!
//! - `presets` - Preset catalog and frame sizing
//! - `geometry` - Pure crop math on plain objects
//! - `controller` - A standalone gesture controller for one asset
//! - `session` - Single and batch sessions with JS-backed encoder/uploader
//! - `encode` - Bytes-in/bytes-out cropping for hosts without a file system
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsBatchSession, JsCropEncoder } from '@cropframe/wasm';
//!
//! await init();
//!
//! const session = JsBatchSession.open_batch(sources, 'feed_portrait', undefined, 390, 844, {});
//! session.asset_loaded(img.naturalWidth, img.naturalHeight);
//! session.on_pinch_update(fx, fy, scale);
//! ```

use wasm_bindgen::prelude::*;

mod controller;
mod convert;
mod encode;
mod geometry;
mod presets;
mod session;

pub use controller::JsTransformController;
pub use encode::{crop_image_bytes, probe_image_dimensions};
pub use geometry::{compute_crop_region, compute_scale_bounds, validate_asset_size};
pub use presets::{compute_frame, get_preset, list_presets};
pub use session::{publish_results, JsBatchSession, JsCancelToken, JsCropEncoder};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
