//! Gesture arbitration.
//!
//! Pan and pinch are recognized together; a double tap is exclusive and
//! wins if it completes. Any pan or pinch movement while the second tap is
//! awaited fails the tap sequence.

/// Recognizer state for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    PanningOrPinching { panning: bool, pinching: bool },
    DoubleTapPending { first_tap_ms: f64 },
}

/// Result of feeding a tap into the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First tap recorded; waiting for a second.
    Pending,
    /// Second tap arrived in time.
    DoubleTap,
    /// Tap arrived mid-gesture.
    Ignored,
}

impl GesturePhase {
    pub fn tap(&mut self, at_ms: f64, window_ms: f64) -> TapOutcome {
        match *self {
            GesturePhase::PanningOrPinching { .. } => TapOutcome::Ignored,
            GesturePhase::DoubleTapPending { first_tap_ms }
                if at_ms >= first_tap_ms && at_ms - first_tap_ms <= window_ms =>
            {
                *self = GesturePhase::Idle;
                TapOutcome::DoubleTap
            }
            _ => {
                *self = GesturePhase::DoubleTapPending { first_tap_ms: at_ms };
                TapOutcome::Pending
            }
        }
    }

    pub fn begin_pan(&mut self) {
        *self = match *self {
            GesturePhase::PanningOrPinching { pinching, .. } => GesturePhase::PanningOrPinching {
                panning: true,
                pinching,
            },
            _ => GesturePhase::PanningOrPinching {
                panning: true,
                pinching: false,
            },
        };
    }

    pub fn begin_pinch(&mut self) {
        *self = match *self {
            GesturePhase::PanningOrPinching { panning, .. } => GesturePhase::PanningOrPinching {
                panning,
                pinching: true,
            },
            _ => GesturePhase::PanningOrPinching {
                panning: false,
                pinching: true,
            },
        };
    }

    pub fn end_pan(&mut self) {
        if let GesturePhase::PanningOrPinching { pinching, .. } = *self {
            *self = if pinching {
                GesturePhase::PanningOrPinching {
                    panning: false,
                    pinching,
                }
            } else {
                GesturePhase::Idle
            };
        }
    }

    pub fn end_pinch(&mut self) {
        if let GesturePhase::PanningOrPinching { panning, .. } = *self {
            *self = if panning {
                GesturePhase::PanningOrPinching {
                    panning,
                    pinching: false,
                }
            } else {
                GesturePhase::Idle
            };
        }
    }

    pub fn is_gesturing(&self) -> bool {
        matches!(self, GesturePhase::PanningOrPinching { .. })
    }
}
