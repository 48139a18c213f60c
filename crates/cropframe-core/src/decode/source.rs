//! Decoding source files into upright RGB buffers.

use std::io::Cursor;

use image::{ImageReader, RgbImage};
use thiserror::Error;

use super::orientation::read_orientation;
use crate::geometry::AssetDimensions;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

/// Decode `bytes` to RGB8 with EXIF orientation applied.
///
/// The returned buffer is in display orientation, the same space crop
/// regions are computed in.
pub fn decode_oriented(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    let orientation = read_orientation(bytes);
    let img = reader(bytes)?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    Ok(orientation.apply(img).into_rgb8())
}

/// Display-orientation dimensions, read from the header without decoding
/// pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Result<AssetDimensions, DecodeError> {
    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if read_orientation(bytes).swaps_dimensions() {
        Ok(AssetDimensions::new(height, width))
    } else {
        Ok(AssetDimensions::new(width, height))
    }
}
