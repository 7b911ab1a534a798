use serde::{Deserialize, Serialize};

use super::bounds::AxisBounds;
use super::range::{Axis, AxisRange};

/// UI-facing slice parameters plus the world bounds they are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceState {
    pub enabled: bool,
    pub ranges: [AxisRange; 3],
    /// World-aligned extrema of the cloud at the current rotation.
    pub world_bounds: [AxisBounds; 3],
}

impl Default for SliceState {
    fn default() -> Self {
        Self {
            enabled: false,
            ranges: [AxisRange::default(); 3],
            world_bounds: [AxisBounds::ZERO; 3],
        }
    }
}

impl SliceState {
    pub fn range(&self, axis: Axis) -> AxisRange {
        self.ranges[axis.index()]
    }

    pub fn range_mut(&mut self, axis: Axis) -> &mut AxisRange {
        &mut self.ranges[axis.index()]
    }

    /// Percentage ranges converted to world coordinates.
    pub fn world_window(&self) -> [AxisBounds; 3] {
        let mut window = [AxisBounds::ZERO; 3];
        for ((out, bounds), range) in window.iter_mut().zip(&self.world_bounds).zip(&self.ranges) {
            let (lo, hi) = range.fractions();
            *out = AxisBounds {
                min: bounds.lerp(lo),
                max: bounds.lerp(hi),
            };
        }
        window
    }
}

/// Everything a recompute depends on besides the source buffers. Two equal
/// keys produce identical output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceKey {
    pub enabled: bool,
    pub ranges: [AxisRange; 3],
    pub colour_override: Option<[f32; 3]>,
    pub rotation: f64,
}
