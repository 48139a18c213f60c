//! Settle animations.
//!
//! When a gesture ends out of bounds the controller reports the clamped
//! target immediately and hands the renderer a `SnapAnimation` that eases
//! the visible transform from where the fingers left it to that target.

use serde::{Deserialize, Serialize};

use crate::geometry::Transform;

/// Easing curves for settle animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    OutQuad,
    #[default]
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// An in-flight interpolation from a released transform to its settled target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapAnimation {
    pub from: Transform,
    pub to: Transform,
    pub duration_ms: f64,
    pub ease: Ease,
    elapsed_ms: f64,
}

impl SnapAnimation {
    pub fn new(from: Transform, to: Transform, duration_ms: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            ease,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt_ms` and return the transform to draw.
    pub fn advance(&mut self, dt_ms: f64) -> Transform {
        self.elapsed_ms += dt_ms.max(0.0);
        self.sample()
    }

    pub fn sample(&self) -> Transform {
        if self.is_finished() {
            return self.to;
        }
        let t = self.ease.apply(self.elapsed_ms / self.duration_ms);
        self.from.lerp(self.to, t)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}
