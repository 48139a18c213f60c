//! JPEG encoding for export.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use super::EncodeError;

/// Encode an RGB image to JPEG bytes.
///
/// `quality` is clamped to 1-100. Crops are published to feeds, so the
/// engine default is 90.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([128, 128, 128]))
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 90).unwrap();

        // SOI
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
        // EOI
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        assert!(encode_jpeg(&gray(10, 10), 0).is_ok());
        assert!(encode_jpeg(&gray(10, 10), 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_zero_size() {
        let result = encode_jpeg(&RgbImage::new(0, 100), 90);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidDimensions {
                width: 0,
                height: 100
            })
        ));
    }

    #[test]
    fn test_encode_jpeg_round_trip_size() {
        let bytes = encode_jpeg(&gray(200, 50), 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 50));
    }
}
