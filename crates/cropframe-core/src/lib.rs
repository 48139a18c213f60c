//! Cropframe Core - aspect-locked crop engine
//!
//! This crate turns a fixed catalog of publishing aspect ratios into
//! interactive, cover-fit crops and exports them as pixel-exact images,
//! either one at a time or as an aspect-locked batch.
//!
//! # Layers
//!
//! - [`preset`]: the aspect ratio catalog with minimum sizes and zoom limits
//! - [`geometry`]: pure cover-fit, pan-limit and crop-rectangle math
//! - [`controller`]: per-asset gesture handling with settle animations
//! - [`session`]: single and batch crop sessions, export and upload
//! - [`decode`], [`transform`], [`encode`]: the `image`-backed file encoder
//!
//! Everything here is synchronous and single-threaded; the host drives
//! gestures and awaits nothing from the engine.

pub mod config;
pub mod controller;
pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod preset;
pub mod session;
pub mod transform;

pub use config::CropConfig;
pub use controller::{Ease, Point, TransformCell, TransformController};
pub use encode::{EncodeError, FileCropEncoder};
pub use error::CropError;
pub use geometry::{crop_region, AssetDimensions, CropRegion, Frame, Transform};
pub use preset::{preset, AspectRatio, Preset, PresetKey};
pub use session::{
    open_batch_crop, open_single_crop, publish, AssetSource, BatchSession, CancelToken,
    CropEncoder, CropOutcome, CropResult, ImageUploader, MediaKind, SessionState, Viewport,
};
