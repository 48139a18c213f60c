//! Encoding cropped images for export.
//!
//! `FileCropEncoder` is the filesystem-backed `CropEncoder`: it decodes a
//! source, extracts the crop at full resolution, downscales, and writes a
//! JPEG next to its other outputs. Hosts with their own image pipeline
//! implement `CropEncoder` directly instead.

mod file;
mod jpeg;

pub use file::FileCropEncoder;
pub use jpeg::encode_jpeg;

use thiserror::Error;

use crate::decode::DecodeError;

/// Errors that can occur while producing a cropped file.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// Reading the source or writing the output failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The source could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
