//! Turning one session entry into a `CropResult`.
//!
//! Images are cropped against full source resolution and only then
//! downscaled when the crop is wider than the preset's export width. Videos
//! are never touched: their result records the framing for the player.

use crate::error::CropError;
use crate::geometry::{crop_region, validate_minimum_size, AssetDimensions, Frame, Transform};
use crate::preset::preset;

use super::collaborators::CropEncoder;
use super::result::{CropMetadata, CropResult, VideoFraming};
use super::{MediaKind, SessionEntry};

/// Export `entry`, measuring it through the encoder if its size is unknown.
///
/// `frame` is the frame derived for the entry's preset; a stored transform
/// carries its own frame and takes precedence.
pub(crate) fn export_entry(
    entry: &mut SessionEntry,
    frame: Frame,
    encoder: &dyn CropEncoder,
) -> Result<CropResult, CropError> {
    match entry.media_kind {
        MediaKind::Video => Ok(video_result(entry, frame)),
        MediaKind::Image => image_result(entry, frame, encoder),
    }
}

fn image_result(
    entry: &mut SessionEntry,
    frame: Frame,
    encoder: &dyn CropEncoder,
) -> Result<CropResult, CropError> {
    if let Some(rejection) = &entry.rejection {
        return Err(rejection.clone());
    }

    if !entry.dimensions.is_loaded() {
        match encoder.probe(&entry.source_uri) {
            Ok(dims) if dims.is_loaded() => entry.dimensions = dims,
            Ok(_) | Err(_) => {
                tracing::warn!(uri = %entry.source_uri, "dimensions unavailable, passing asset through");
                return Ok(passthrough_result(entry));
            }
        }
    }

    let dims = entry.dimensions;
    let p = preset(entry.preset_key);
    validate_minimum_size(dims.width, dims.height, p.min_width, p.min_height)?;

    let transform = framing(entry.transform, dims, frame);
    let region = crop_region(dims, transform.frame(), &transform);
    let target_width = (region.width > p.recommended_width).then_some(p.recommended_width);

    let encoded = encoder
        .encode_crop(&entry.source_uri, &region, target_width)
        .map_err(|e| CropError::EncodeFailure {
            uri: entry.source_uri.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(
        uri = %entry.source_uri,
        output = %encoded.uri,
        x = region.origin_x,
        y = region.origin_y,
        width = region.width,
        height = region.height,
        "image cropped"
    );

    Ok(CropResult {
        uri: encoded.uri,
        width: encoded.width,
        height: encoded.height,
        metadata: CropMetadata {
            preset_key: p.key,
            aspect_ratio: p.aspect_ratio,
            source_uri: entry.source_uri.clone(),
            crop: Some(region),
            video: None,
            passthrough: false,
        },
    })
}

fn video_result(entry: &SessionEntry, frame: Frame) -> CropResult {
    let p = preset(entry.preset_key);
    let dims = entry.dimensions;
    let transform = framing(entry.transform, dims, frame);

    CropResult {
        uri: entry.source_uri.clone(),
        width: dims.width,
        height: dims.height,
        metadata: CropMetadata {
            preset_key: p.key,
            aspect_ratio: p.aspect_ratio,
            source_uri: entry.source_uri.clone(),
            crop: None,
            video: Some(VideoFraming {
                transform,
                source: dims,
            }),
            passthrough: false,
        },
    }
}

fn passthrough_result(entry: &SessionEntry) -> CropResult {
    let p = preset(entry.preset_key);
    CropResult {
        uri: entry.source_uri.clone(),
        width: 0,
        height: 0,
        metadata: CropMetadata {
            preset_key: p.key,
            aspect_ratio: p.aspect_ratio,
            source_uri: entry.source_uri.clone(),
            crop: None,
            video: None,
            passthrough: true,
        },
    }
}

/// The stored transform if it has cover-fit context, else an untouched
/// cover fit of the asset in `frame`.
fn framing(stored: Option<Transform>, dims: AssetDimensions, frame: Frame) -> Transform {
    match stored {
        Some(transform) if transform.has_context() => transform,
        _ if dims.is_loaded() => Transform::cover(dims, frame),
        _ => Transform {
            frame_width: frame.width,
            frame_height: frame.height,
            ..Transform::default()
        },
    }
}
