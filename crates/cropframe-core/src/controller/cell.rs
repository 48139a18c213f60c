//! Shared transform cell.
//!
//! Gesture handlers write here at input frequency; the renderer and the
//! session read it synchronously without rebuilding any view. Clones share
//! the same slot.

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Transform;

#[derive(Debug, Default)]
struct Slot {
    value: Cell<Transform>,
    revision: Cell<u64>,
}

/// A single-threaded, observable transform slot.
#[derive(Debug, Clone, Default)]
pub struct TransformCell {
    slot: Rc<Slot>,
}

impl TransformCell {
    pub fn new(value: Transform) -> Self {
        Self {
            slot: Rc::new(Slot {
                value: Cell::new(value),
                revision: Cell::new(0),
            }),
        }
    }

    #[inline]
    pub fn get(&self) -> Transform {
        self.slot.value.get()
    }

    pub fn set(&self, value: Transform) {
        self.slot.value.set(value);
        self.slot.revision.set(self.slot.revision.get().wrapping_add(1));
    }

    /// Bumped on every write; observers compare it to skip redundant work.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.slot.revision.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let cell = TransformCell::default();
        let reader = cell.clone();

        cell.set(Transform {
            zoom: 2.0,
            ..Transform::default()
        });

        assert_eq!(reader.get().zoom, 2.0);
        assert_eq!(reader.revision(), 1);
    }
}
