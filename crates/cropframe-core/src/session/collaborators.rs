//! Contracts with the outside world.
//!
//! The session only reaches beyond memory through these seams: an encoder
//! that materializes pixel crops, an uploader that publishes them, a gate
//! that paces decode buffers between assets, and a token for cooperative
//! cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::encode::EncodeError;
use crate::geometry::{AssetDimensions, CropRegion};

/// A newly written asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedAsset {
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

/// Produces pixel-cropped images from source assets.
pub trait CropEncoder {
    /// Natural (orientation-corrected) size of the source.
    fn probe(&self, uri: &str) -> Result<AssetDimensions, EncodeError>;

    /// Crop `rect` out of the source, then downscale to `target_width` if given.
    fn encode_crop(
        &self,
        uri: &str,
        rect: &CropRegion,
        target_width: Option<u32>,
    ) -> Result<EncodedAsset, EncodeError>;
}

/// Publishes local images and returns their remote URLs in input order.
pub trait ImageUploader {
    fn upload_images(&self, uris: &[String]) -> Result<Vec<String>, String>;
}

/// Paces decode buffers between sequential export steps.
///
/// Export never holds two decode buffers at once; the gate decides whether
/// the previous asset's memory must be reclaimed before the next decode.
pub trait ReclaimGate {
    fn before_decode(&mut self, index: usize, estimated_bytes: u64);
    fn after_release(&mut self, index: usize, released_bytes: u64);
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl ReclaimGate for Immediate {
    fn before_decode(&mut self, _index: usize, _estimated_bytes: u64) {}

    fn after_release(&mut self, _index: usize, _released_bytes: u64) {}
}

/// Waits for reclamation whenever released-but-unreclaimed memory plus the
/// next decode would exceed the budget.
pub struct DecodeBudget<F: FnMut()> {
    budget_bytes: u64,
    pending_bytes: u64,
    reclaim: F,
    waits: usize,
}

impl<F: FnMut()> DecodeBudget<F> {
    pub fn new(budget_bytes: u64, reclaim: F) -> Self {
        Self {
            budget_bytes,
            pending_bytes: 0,
            reclaim,
            waits: 0,
        }
    }

    pub fn from_config(config: &CropConfig, reclaim: F) -> Self {
        Self::new(config.decode_budget_bytes, reclaim)
    }

    /// How many times the gate waited for reclamation.
    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl<F: FnMut()> ReclaimGate for DecodeBudget<F> {
    fn before_decode(&mut self, index: usize, estimated_bytes: u64) {
        if estimated_bytes > self.budget_bytes {
            tracing::warn!(
                index,
                estimated_bytes,
                budget_bytes = self.budget_bytes,
                "single decode exceeds budget"
            );
        }
        if self.pending_bytes > 0
            && self.pending_bytes.saturating_add(estimated_bytes) > self.budget_bytes
        {
            tracing::debug!(index, pending_bytes = self.pending_bytes, "waiting for reclamation");
            (self.reclaim)();
            self.pending_bytes = 0;
            self.waits += 1;
        }
    }

    fn after_release(&mut self, _index: usize, released_bytes: u64) {
        self.pending_bytes = self.pending_bytes.saturating_add(released_bytes);
    }
}

/// Cooperative cancellation flag, checked between assets.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_waits_when_exceeded() {
        let mut calls = 0;
        {
            let mut gate = DecodeBudget::new(100, || calls += 1);
            gate.before_decode(0, 60);
            gate.after_release(0, 60);
            gate.before_decode(1, 60);
            assert_eq!(gate.waits(), 1);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_budget_accumulates_small_assets() {
        let mut gate = DecodeBudget::new(100, || {});
        for i in 0..3 {
            gate.before_decode(i, 30);
            gate.after_release(i, 30);
        }
        // 90 pending: the third decode fitted, the fourth does not.
        assert_eq!(gate.waits(), 0);
        gate.before_decode(3, 30);
        assert_eq!(gate.waits(), 1);
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
