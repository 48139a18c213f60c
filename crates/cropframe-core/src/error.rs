//! Error types for the crop engine.
//!
//! Codec-level failures live next to their codecs (`DecodeError`,
//! `EncodeError`); this module holds the errors surfaced by the geometry,
//! controller and session layers.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the crop engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// The source asset is smaller than the preset's minimum.
    #[error(
        "Image is too small ({width}x{height}); at least {min_width}x{min_height} pixels are required"
    )]
    AssetTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    /// The asset's dimensions could not be resolved.
    #[error("Could not read dimensions of {uri}")]
    AssetUnloadable { uri: String },

    /// The encoder collaborator failed to materialize a crop.
    #[error("Failed to export {uri}: {message}")]
    EncodeFailure { uri: String, message: String },

    /// A preset key that is not in the registry.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// An asset index past the end of the batch.
    #[error("Asset index {index} out of range (batch has {len} assets)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A batch opened with no assets.
    #[error("Batch contains no assets")]
    EmptyBatch,

    /// The session no longer accepts edits.
    #[error("Session is {state:?}")]
    SessionClosed { state: SessionState },

    /// The upload collaborator failed or returned a malformed response.
    #[error("Upload failed: {0}")]
    UploadFailure(String),
}
