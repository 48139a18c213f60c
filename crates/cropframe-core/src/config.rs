//! Tunable parameters for the crop engine.
//!
//! `CropConfig` is passed explicitly into controllers and sessions. Every
//! field has a serde default so hosts may supply a partial object.

use serde::{Deserialize, Serialize};

use crate::controller::Ease;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Fraction a live pinch may overshoot `[1, max_zoom]` before release.
    #[serde(default = "default_pinch_overshoot")]
    pub pinch_overshoot: f64,
    /// Zoom level the double tap toggles to (capped at the preset's max zoom).
    #[serde(default = "default_double_tap_zoom")]
    pub double_tap_zoom: f64,
    /// Maximum delay between two taps recognized as a double tap.
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: f64,
    /// Duration of the settle animation after a gesture ends.
    #[serde(default = "default_snap_duration_ms")]
    pub snap_duration_ms: f64,
    /// Easing curve of the settle animation.
    #[serde(default)]
    pub snap_ease: Ease,
    /// Maximum share of the viewport height the frame may occupy.
    #[serde(default = "default_max_frame_height_fraction")]
    pub max_frame_height_fraction: f64,
    /// JPEG quality used by the file encoder (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Upload attempts before a publish fails.
    #[serde(default = "default_upload_attempts")]
    pub upload_attempts: u32,
    /// Decoded-buffer budget per export step, in bytes.
    #[serde(default = "default_decode_budget_bytes")]
    pub decode_budget_bytes: u64,
}

fn default_pinch_overshoot() -> f64 {
    0.2
}

fn default_double_tap_zoom() -> f64 {
    1.5
}

fn default_double_tap_window_ms() -> f64 {
    300.0
}

fn default_snap_duration_ms() -> f64 {
    220.0
}

fn default_max_frame_height_fraction() -> f64 {
    0.7
}

fn default_jpeg_quality() -> u8 {
    90
}

fn default_upload_attempts() -> u32 {
    3
}

fn default_decode_budget_bytes() -> u64 {
    // Room for one 24 MP decode at peak
    192 * 1024 * 1024
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            pinch_overshoot: default_pinch_overshoot(),
            double_tap_zoom: default_double_tap_zoom(),
            double_tap_window_ms: default_double_tap_window_ms(),
            snap_duration_ms: default_snap_duration_ms(),
            snap_ease: Ease::default(),
            max_frame_height_fraction: default_max_frame_height_fraction(),
            jpeg_quality: default_jpeg_quality(),
            upload_attempts: default_upload_attempts(),
            decode_budget_bytes: default_decode_budget_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CropConfig::default();
        assert_eq!(config.pinch_overshoot, 0.2);
        assert_eq!(config.double_tap_zoom, 1.5);
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.snap_ease, Ease::OutCubic);
    }
}
