//! Interactive transform controller.
//!
//! One `TransformController` exists per asset being edited. It turns pinch,
//! pan and double-tap input into a `Transform`, keeping the asset covering
//! the frame once every gesture settles.
//!
//! # Live vs. Settled
//!
//! While fingers are down the transform may leave its bounds (zoom overshoots
//! by `pinch_overshoot`, pan is unclamped). On release the controller clamps
//! to the settled target, publishes that target to its `TransformCell`
//! immediately and schedules a `SnapAnimation` for the renderer. Readers of
//! the cell therefore only ever see the settled value after a gesture ends.
//!
//! # Unloaded Assets
//!
//! Until `on_asset_loaded` records valid dimensions every gesture handler is
//! a no-op and `current_crop_preview` returns `None`, which callers treat as
//! "export the asset unmodified".

mod cell;
mod gesture;
mod snap;

pub use cell::TransformCell;
pub use gesture::{GesturePhase, TapOutcome};
pub use snap::{Ease, SnapAnimation};

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::error::CropError;
use crate::geometry::{crop_region, validate_minimum_size, AssetDimensions, CropRegion, Frame, Transform};
use crate::preset::Preset;

/// A point in frame coordinates (display units, origin at the frame's top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Zoom levels closer than this are treated as equal.
const ZOOM_EPSILON: f64 = 1e-3;

/// Per-asset gesture state machine.
#[derive(Debug)]
pub struct TransformController {
    uri: String,
    frame: Frame,
    max_zoom: f64,
    min_width: u32,
    min_height: u32,
    config: CropConfig,
    asset: AssetDimensions,
    live: Transform,
    cell: TransformCell,
    phase: GesturePhase,
    animation: Option<SnapAnimation>,
}

impl TransformController {
    pub fn new(uri: impl Into<String>, preset: &Preset, frame: Frame, config: &CropConfig) -> Self {
        Self {
            uri: uri.into(),
            frame,
            max_zoom: preset.max_zoom_multiplier,
            min_width: preset.min_width,
            min_height: preset.min_height,
            config: config.clone(),
            asset: AssetDimensions::UNLOADED,
            live: Transform::default(),
            cell: TransformCell::default(),
            phase: GesturePhase::Idle,
            animation: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn asset(&self) -> AssetDimensions {
        self.asset
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.asset.is_loaded()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Handle on the reported transform, for hosts that observe it directly.
    pub fn cell(&self) -> TransformCell {
        self.cell.clone()
    }

    /// The reported (settled once gestures end) transform.
    pub fn transform(&self) -> Transform {
        self.cell.get()
    }

    /// The reported transform clamped into bounds, even mid-gesture.
    ///
    /// This is what gets persisted: a transform caught while fingers are
    /// still down may overshoot zoom or pan.
    pub fn settled(&self) -> Transform {
        self.cell.get().settle(self.max_zoom)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Record the asset's natural size.
    ///
    /// A `saved` transform with cover-fit context is restored (clamped into
    /// bounds) so a re-edit keeps the user's earlier framing; otherwise the
    /// transform resets to cover-fit at zoom 1. Zero dimensions leave the
    /// controller unloaded; an asset below the preset minimum is rejected
    /// and also leaves it unloaded.
    pub fn on_asset_loaded(
        &mut self,
        width: u32,
        height: u32,
        saved: Option<Transform>,
    ) -> Result<(), CropError> {
        self.asset = AssetDimensions::UNLOADED;
        self.animation = None;
        self.phase = GesturePhase::Idle;

        let dims = AssetDimensions::new(width, height);
        if !dims.is_loaded() {
            tracing::warn!(uri = %self.uri, width, height, "asset loaded without dimensions");
            return Err(CropError::AssetUnloadable {
                uri: self.uri.clone(),
            });
        }
        validate_minimum_size(width, height, self.min_width, self.min_height)?;

        self.asset = dims;
        self.live = match saved {
            Some(transform) if transform.has_context() => transform.settle(self.max_zoom),
            _ => Transform::cover(dims, self.frame),
        };
        self.cell.set(self.live);
        tracing::debug!(uri = %self.uri, width, height, restored = saved.is_some(), "asset loaded");
        Ok(())
    }

    /// Switch to a new frame (preset change), resetting to cover-fit.
    pub fn set_frame(&mut self, preset: &Preset, frame: Frame) -> Result<(), CropError> {
        self.frame = frame;
        self.max_zoom = preset.max_zoom_multiplier;
        self.min_width = preset.min_width;
        self.min_height = preset.min_height;

        if !self.is_loaded() {
            return Ok(());
        }
        let dims = self.asset;
        self.on_asset_loaded(dims.width, dims.height, None)
    }

    /// Live pinch update.
    ///
    /// `scale_delta` is the multiplicative change since the previous update;
    /// `focal` stays anchored over the same asset content.
    pub fn on_pinch_update(&mut self, focal: Point, scale_delta: f64) {
        if !self.is_loaded() || !scale_delta.is_finite() || scale_delta <= 0.0 {
            return;
        }
        self.phase.begin_pinch();
        self.animation = None;

        let overshoot = self.config.pinch_overshoot.max(0.0);
        let low = (1.0 - overshoot).max(f64::MIN_POSITIVE);
        let high = self.max_zoom.max(1.0) * (1.0 + overshoot);

        let old_zoom = self.live.zoom;
        let new_zoom = (old_zoom * scale_delta).clamp(low, high);
        let ratio = new_zoom / old_zoom;

        let fx = focal.x - self.frame.width / 2.0;
        let fy = focal.y - self.frame.height / 2.0;
        self.live.zoom = new_zoom;
        self.live.pan_x = fx - (fx - self.live.pan_x) * ratio;
        self.live.pan_y = fy - (fy - self.live.pan_y) * ratio;
        self.cell.set(self.live);
    }

    /// Pinch released: snap zoom into range, then pan into the settled limits.
    pub fn on_pinch_end(&mut self) -> Option<Transform> {
        if !self.is_loaded() {
            return None;
        }
        self.phase.end_pinch();
        let target = self.live.settle(self.max_zoom);
        Some(self.settle_to(target))
    }

    /// Live pan update, with one or two contact points.
    pub fn on_pan_update(&mut self, dx: f64, dy: f64, pointers: u32) {
        if !self.is_loaded() || !(1..=2).contains(&pointers) || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.phase.begin_pan();
        self.animation = None;

        self.live.pan_x += dx;
        self.live.pan_y += dy;
        self.cell.set(self.live);
    }

    /// Pan released: clamp pan into the current bounds.
    pub fn on_pan_end(&mut self) -> Option<Transform> {
        if !self.is_loaded() {
            return None;
        }
        self.phase.end_pan();
        let target = if self.phase.is_gesturing() {
            // Pinch still active; its end settles zoom and pan together.
            self.live.clamp_pan()
        } else {
            self.live.settle(self.max_zoom)
        };
        Some(self.settle_to(target))
    }

    /// Toggle between cover-fit and the double-tap zoom, recentring.
    pub fn on_double_tap(&mut self) -> Option<Transform> {
        if !self.is_loaded() {
            return None;
        }
        let zoomed = self.config.double_tap_zoom.min(self.max_zoom).max(1.0);
        let zoom = if (self.live.zoom - 1.0).abs() <= ZOOM_EPSILON {
            zoomed
        } else {
            1.0
        };
        let target = Transform {
            zoom,
            pan_x: 0.0,
            pan_y: 0.0,
            ..self.live
        };
        tracing::debug!(uri = %self.uri, zoom, "double tap");
        Some(self.settle_to(target))
    }

    /// Feed a raw tap; fires `on_double_tap` when a double tap completes.
    pub fn on_tap(&mut self, at_ms: f64) -> TapOutcome {
        if !self.is_loaded() {
            return TapOutcome::Ignored;
        }
        let outcome = self.phase.tap(at_ms, self.config.double_tap_window_ms);
        if outcome == TapOutcome::DoubleTap {
            self.on_double_tap();
        }
        outcome
    }

    /// Advance the settle animation and return the transform to render.
    pub fn advance_animation(&mut self, dt_ms: f64) -> Transform {
        match self.animation.as_mut() {
            Some(animation) => {
                let frame = animation.advance(dt_ms);
                if animation.is_finished() {
                    self.animation = None;
                }
                frame
            }
            None => self.live,
        }
    }

    /// Crop rectangle for the reported transform, `None` while unloaded.
    pub fn current_crop_preview(&self) -> Option<CropRegion> {
        if !self.is_loaded() {
            return None;
        }
        Some(crop_region(self.asset, self.frame, &self.cell.get()))
    }

    fn settle_to(&mut self, target: Transform) -> Transform {
        if target != self.live {
            self.animation = Some(SnapAnimation::new(
                self.live,
                target,
                self.config.snap_duration_ms,
                self.config.snap_ease,
            ));
        }
        self.live = target;
        self.cell.set(target);
        tracing::debug!(
            uri = %self.uri,
            zoom = target.zoom,
            pan_x = target.pan_x,
            pan_y = target.pan_y,
            "transform settled"
        );
        target
    }
}
