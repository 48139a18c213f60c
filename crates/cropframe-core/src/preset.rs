//! Aspect-ratio presets.
//!
//! A preset names the frame shape a user crops against, the minimum source
//! size it accepts, the size it exports at and how far the user may zoom.
//! The table is fixed at compile time and never mutated.
//!
//! # Frames
//!
//! The on-screen frame is derived from a preset and the available viewport:
//! it spans the viewport width unless that would make it taller than
//! `max_height_fraction` of the viewport, in which case the height is capped
//! and the width follows from the ratio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CropError;
use crate::geometry::Frame;

/// Key identifying a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKey {
    FeedSquare,
    FeedPortrait,
    FeedLandscape,
    Avatar,
    Cover,
    Story,
}

impl PresetKey {
    /// Every key, in table order.
    pub const ALL: [PresetKey; 6] = [
        PresetKey::FeedSquare,
        PresetKey::FeedPortrait,
        PresetKey::FeedLandscape,
        PresetKey::Avatar,
        PresetKey::Cover,
        PresetKey::Story,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetKey::FeedSquare => "feed_square",
            PresetKey::FeedPortrait => "feed_portrait",
            PresetKey::FeedLandscape => "feed_landscape",
            PresetKey::Avatar => "avatar",
            PresetKey::Cover => "cover",
            PresetKey::Story => "story",
        }
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKey {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CropError::UnknownPreset(s.to_string()))
    }
}

/// Integer aspect ratio, width:height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    #[inline]
    pub fn value(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Fractional insets marking where overlaid UI will cover the image.
///
/// Guidance only; crop math never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Rectangle in display units, relative to the frame's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An immutable crop preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub key: PresetKey,
    pub aspect_ratio: AspectRatio,
    /// Minimum acceptable source width in pixels.
    pub min_width: u32,
    /// Minimum acceptable source height in pixels.
    pub min_height: u32,
    /// Export target width in pixels.
    pub recommended_width: u32,
    /// Export target height in pixels.
    pub recommended_height: u32,
    /// Upper bound of the zoom multiplier over cover-fit.
    pub max_zoom_multiplier: f64,
    pub is_circular_mask: bool,
    pub safe_zone: Option<SafeZone>,
}

impl Preset {
    /// Compute the on-screen frame for this preset inside a viewport.
    ///
    /// Returns a zero frame for a non-positive viewport.
    pub fn frame_for_viewport(
        &self,
        viewport_width: f64,
        viewport_height: f64,
        max_height_fraction: f64,
    ) -> Frame {
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return Frame::new(0.0, 0.0);
        }

        let ratio = self.aspect_ratio.value();
        let max_height = viewport_height * max_height_fraction.clamp(0.0, 1.0);

        let width = viewport_width;
        let height = width / ratio;
        if height <= max_height {
            Frame::new(width, height)
        } else {
            Frame::new(max_height * ratio, max_height)
        }
    }

    /// Safe-zone guide inside `frame`, or the whole frame if the preset has none.
    pub fn safe_zone_rect(&self, frame: Frame) -> GuideRect {
        match self.safe_zone {
            Some(zone) => GuideRect {
                x: frame.width * zone.left,
                y: frame.height * zone.top,
                width: frame.width * (1.0 - zone.left - zone.right).max(0.0),
                height: frame.height * (1.0 - zone.top - zone.bottom).max(0.0),
            },
            None => GuideRect {
                x: 0.0,
                y: 0.0,
                width: frame.width,
                height: frame.height,
            },
        }
    }
}

static PRESETS: [Preset; 6] = [
    Preset {
        key: PresetKey::FeedSquare,
        aspect_ratio: AspectRatio::new(1, 1),
        min_width: 320,
        min_height: 320,
        recommended_width: 1080,
        recommended_height: 1080,
        max_zoom_multiplier: 5.0,
        is_circular_mask: false,
        safe_zone: None,
    },
    Preset {
        key: PresetKey::FeedPortrait,
        aspect_ratio: AspectRatio::new(4, 5),
        min_width: 320,
        min_height: 400,
        recommended_width: 1080,
        recommended_height: 1350,
        max_zoom_multiplier: 5.0,
        is_circular_mask: false,
        safe_zone: None,
    },
    Preset {
        key: PresetKey::FeedLandscape,
        aspect_ratio: AspectRatio::new(191, 100),
        min_width: 400,
        min_height: 210,
        recommended_width: 1080,
        recommended_height: 566,
        max_zoom_multiplier: 5.0,
        is_circular_mask: false,
        safe_zone: None,
    },
    Preset {
        key: PresetKey::Avatar,
        aspect_ratio: AspectRatio::new(1, 1),
        min_width: 200,
        min_height: 200,
        recommended_width: 400,
        recommended_height: 400,
        max_zoom_multiplier: 4.0,
        is_circular_mask: true,
        safe_zone: None,
    },
    Preset {
        key: PresetKey::Cover,
        aspect_ratio: AspectRatio::new(3, 1),
        min_width: 900,
        min_height: 300,
        recommended_width: 1500,
        recommended_height: 500,
        max_zoom_multiplier: 3.0,
        is_circular_mask: false,
        // Avatar overlaps the lower-left corner of the cover.
        safe_zone: Some(SafeZone {
            top: 0.0,
            right: 0.0,
            bottom: 0.3,
            left: 0.25,
        }),
    },
    Preset {
        key: PresetKey::Story,
        aspect_ratio: AspectRatio::new(9, 16),
        min_width: 540,
        min_height: 960,
        recommended_width: 1080,
        recommended_height: 1920,
        max_zoom_multiplier: 4.0,
        is_circular_mask: false,
        safe_zone: Some(SafeZone {
            top: 0.14,
            right: 0.0,
            bottom: 0.2,
            left: 0.0,
        }),
    },
];

/// Look up a preset by key.
pub fn preset(key: PresetKey) -> &'static Preset {
    match key {
        PresetKey::FeedSquare => &PRESETS[0],
        PresetKey::FeedPortrait => &PRESETS[1],
        PresetKey::FeedLandscape => &PRESETS[2],
        PresetKey::Avatar => &PRESETS[3],
        PresetKey::Cover => &PRESETS[4],
        PresetKey::Story => &PRESETS[5],
    }
}

/// The full preset table.
pub fn all_presets() -> &'static [Preset] {
    &PRESETS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_key() {
        for key in PresetKey::ALL {
            assert_eq!(preset(key).key, key);
        }
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            "feed_square".parse::<PresetKey>().unwrap(),
            PresetKey::FeedSquare
        );
        assert_eq!("story".parse::<PresetKey>().unwrap(), PresetKey::Story);
        assert_eq!(
            "banner".parse::<PresetKey>(),
            Err(CropError::UnknownPreset("banner".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_parse() {
        for key in PresetKey::ALL {
            assert_eq!(key.to_string().parse::<PresetKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_table_invariants() {
        for p in all_presets() {
            assert!(p.max_zoom_multiplier >= 1.0, "{} zoom", p.key);
            assert!(p.min_width <= p.recommended_width, "{} width", p.key);
            assert!(p.min_height <= p.recommended_height, "{} height", p.key);
            // Recommended size matches the declared ratio within a pixel.
            let expected_h = p.recommended_width as f64 / p.aspect_ratio.value();
            assert!(
                (expected_h - p.recommended_height as f64).abs() <= 1.0,
                "{} ratio",
                p.key
            );
        }
    }

    #[test]
    fn test_frame_uses_full_width() {
        let frame = preset(PresetKey::FeedPortrait).frame_for_viewport(400.0, 900.0, 0.7);
        assert_eq!(frame, Frame::new(400.0, 500.0));
    }

    #[test]
    fn test_frame_clamped_by_height() {
        // 9:16 at full width would be 711 tall; the cap is 0.7 * 800 = 560.
        let frame = preset(PresetKey::Story).frame_for_viewport(400.0, 800.0, 0.7);
        assert!((frame.height - 560.0).abs() < 1e-9);
        assert!((frame.width - 315.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_zero_viewport() {
        let frame = preset(PresetKey::FeedSquare).frame_for_viewport(0.0, 800.0, 0.7);
        assert_eq!(frame, Frame::new(0.0, 0.0));
    }

    #[test]
    fn test_safe_zone_rect() {
        let story = preset(PresetKey::Story);
        let rect = story.safe_zone_rect(Frame::new(100.0, 200.0));
        assert!((rect.y - 28.0).abs() < 1e-9);
        assert!((rect.height - 132.0).abs() < 1e-9);
        assert_eq!(rect.width, 100.0);

        let square = preset(PresetKey::FeedSquare);
        let rect = square.safe_zone_rect(Frame::new(100.0, 100.0));
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 100.0);
    }
}
