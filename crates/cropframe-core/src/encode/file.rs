//! Filesystem-backed crop encoder.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::CropConfig;
use crate::decode::{decode_oriented, probe_dimensions};
use crate::geometry::{AssetDimensions, CropRegion};
use crate::session::{CropEncoder, EncodedAsset};
use crate::transform::{extract_region, scale_to_width, FilterType};

use super::{encode_jpeg, EncodeError};

const FILE_SCHEME: &str = "file://";

/// Writes JPEG crops of local files into `output_dir`.
///
/// Each call holds at most one decoded buffer, and every intermediate
/// buffer is dropped before the next step allocates.
#[derive(Debug, Clone)]
pub struct FileCropEncoder {
    output_dir: PathBuf,
    quality: u8,
    filter: FilterType,
}

impl FileCropEncoder {
    pub fn new(output_dir: impl Into<PathBuf>, config: &CropConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            quality: config.jpeg_quality,
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Claim a fresh output file for a crop of `source`.
    ///
    /// Names are `{stem}_crop_{x}_{y}_{w}x{h}.jpg`; a numeric suffix is added
    /// when that name is taken, so sources sharing a file name in different
    /// directories never overwrite each other's crops.
    fn create_output(&self, source: &Path, rect: &CropRegion) -> Result<(PathBuf, File), EncodeError> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let base = format!(
            "{stem}_crop_{}_{}_{}x{}",
            rect.origin_x, rect.origin_y, rect.width, rect.height
        );

        let mut suffix = 0u32;
        loop {
            let name = match suffix {
                0 => format!("{base}.jpg"),
                n => format!("{base}_{n}.jpg"),
            };
            let path = self.output_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(io_error(&path, e)),
            }
        }
    }
}

fn local_path(uri: &str) -> &Path {
    Path::new(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

fn io_error(path: &Path, error: io::Error) -> EncodeError {
    EncodeError::Io(format!("{}: {error}", path.display()))
}

fn read(path: &Path) -> Result<Vec<u8>, EncodeError> {
    fs::read(path).map_err(|e| io_error(path, e))
}

impl CropEncoder for FileCropEncoder {
    fn probe(&self, uri: &str) -> Result<AssetDimensions, EncodeError> {
        let bytes = read(local_path(uri))?;
        Ok(probe_dimensions(&bytes)?)
    }

    fn encode_crop(
        &self,
        uri: &str,
        rect: &CropRegion,
        target_width: Option<u32>,
    ) -> Result<EncodedAsset, EncodeError> {
        let source = local_path(uri);
        let bytes = read(source)?;
        let decoded = decode_oriented(&bytes)?;
        drop(bytes);

        let cropped = extract_region(&decoded, rect);
        drop(decoded);

        let output = match target_width {
            Some(width) => scale_to_width(&cropped, width, self.filter),
            None => cropped,
        };
        let jpeg = encode_jpeg(&output, self.quality)?;

        let (path, mut file) = self.create_output(source, rect)?;
        file.write_all(&jpeg).map_err(|e| io_error(&path, e))?;

        tracing::debug!(
            source = %source.display(),
            output = %path.display(),
            width = output.width(),
            height = output.height(),
            bytes = jpeg.len(),
            "crop written"
        );

        let scheme = if uri.starts_with(FILE_SCHEME) { FILE_SCHEME } else { "" };
        Ok(EncodedAsset {
            uri: format!("{scheme}{}", path.display()),
            width: output.width(),
            height: output.height(),
        })
    }
}
