//! Export results.

use serde::{Deserialize, Serialize};

use crate::error::CropError;
use crate::geometry::{AssetDimensions, CropRegion, Transform};
use crate::preset::{AspectRatio, PresetKey};

/// Framing a player must reapply to a video at playback time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoFraming {
    pub transform: Transform,
    pub source: AssetDimensions,
}

/// Everything a consumer needs to know about how an asset was cropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropMetadata {
    pub preset_key: PresetKey,
    pub aspect_ratio: AspectRatio,
    pub source_uri: String,
    /// Source rectangle that was extracted (images only).
    pub crop: Option<CropRegion>,
    /// Set for videos, which are never pixel-cropped.
    pub video: Option<VideoFraming>,
    /// The asset could not be measured and was exported unmodified.
    pub passthrough: bool,
}

/// The final product for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropResult {
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub metadata: CropMetadata,
}

impl CropResult {
    pub fn is_video(&self) -> bool {
        self.metadata.video.is_some()
    }
}

/// A per-asset export failure.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFailure {
    pub index: usize,
    pub source_uri: String,
    pub error: CropError,
}

/// Ordered outcome of a finalize pass, one slot per asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinalizeReport {
    pub outcomes: Vec<Result<CropResult, AssetFailure>>,
}

impl FinalizeReport {
    /// Whether every asset exported.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    pub fn results(&self) -> impl Iterator<Item = &CropResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssetFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// All results in order, or every failure if any asset failed.
    pub fn into_results(self) -> Result<Vec<CropResult>, Vec<AssetFailure>> {
        let mut results = Vec::with_capacity(self.outcomes.len());
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(failure) => failures.push(failure),
            }
        }
        if failures.is_empty() {
            Ok(results)
        } else {
            Err(failures)
        }
    }
}

/// A flow either finishes with a value or is cancelled by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum CropOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> CropOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CropOutcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            CropOutcome::Completed(value) => Some(value),
            CropOutcome::Cancelled => None,
        }
    }
}
