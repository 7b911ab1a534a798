use constants::coordinate_system::rotate_about_up;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Points per rayon task for the bounds pass.
const CHUNK_POINTS: usize = 25_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub const ZERO: AxisBounds = AxisBounds { min: 0.0, max: 0.0 };

    fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn merge(self, other: AxisBounds) -> AxisBounds {
        AxisBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// World value at fraction `t` of the span. Exact at both ends.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min * (1.0 - t) + self.max * t
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Local point rotated into world space about the up axis.
pub fn rotate_xy(point: &[f32], angle_rad: f64) -> [f64; 3] {
    let (x, y) = rotate_about_up(f64::from(point[0]), f64::from(point[1]), angle_rad);
    [x, y, f64::from(point[2])]
}

/// World-aligned extrema of the cloud after rotating it by `angle_rad`.
/// An empty cloud yields zero-width bounds at the origin.
pub fn rotated_bounds(positions: &[f32], angle_rad: f64) -> [AxisBounds; 3] {
    let reduced = positions
        .par_chunks(CHUNK_POINTS * 3)
        .map(|chunk| {
            let mut local = [AxisBounds::empty(); 3];
            for point in chunk.chunks_exact(3) {
                let world = rotate_xy(point, angle_rad);
                for (axis, value) in local.iter_mut().zip(world) {
                    axis.include(value);
                }
            }
            local
        })
        .reduce_with(|a, b| [a[0].merge(b[0]), a[1].merge(b[1]), a[2].merge(b[2])]);

    match reduced {
        Some(bounds) if bounds[0].min.is_finite() => bounds,
        _ => [AxisBounds::ZERO; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn square() -> Vec<f32> {
        vec![
            -2.0, -1.0, 0.0, //
            2.0, -1.0, 1.0, //
            2.0, 1.0, 2.0, //
            -2.0, 1.0, 3.0,
        ]
    }

    fn assert_bounds_eq(a: &[AxisBounds; 3], b: &[AxisBounds; 3]) {
        for (lhs, rhs) in a.iter().zip(b) {
            assert_abs_diff_eq!(lhs.min, rhs.min, epsilon = 1e-9);
            assert_abs_diff_eq!(lhs.max, rhs.max, epsilon = 1e-9);
        }
    }

    #[test]
    fn unrotated_bounds_are_raw_extrema() {
        let bounds = rotated_bounds(&square(), 0.0);
        assert_eq!(bounds[0], AxisBounds { min: -2.0, max: 2.0 });
        assert_eq!(bounds[1], AxisBounds { min: -1.0, max: 1.0 });
        assert_eq!(bounds[2], AxisBounds { min: 0.0, max: 3.0 });
    }

    #[test]
    fn full_turn_matches_no_turn() {
        let positions = square();
        assert_bounds_eq(&rotated_bounds(&positions, TAU), &rotated_bounds(&positions, 0.0));
    }

    #[test]
    fn quarter_turn_swaps_horizontal_extents() {
        let bounds = rotated_bounds(&square(), FRAC_PI_2);
        assert_abs_diff_eq!(bounds[0].min, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bounds[0].max, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bounds[1].min, -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bounds[1].max, 2.0, epsilon = 1e-9);
        assert_eq!(bounds[2], AxisBounds { min: 0.0, max: 3.0 });
    }

    #[test]
    fn bounds_span_many_chunks() {
        let positions: Vec<f32> = (0..(CHUNK_POINTS * 2 + 7))
            .flat_map(|i| [i as f32, -(i as f32), 1.0])
            .collect();
        let bounds = rotated_bounds(&positions, 0.0);
        let last = (CHUNK_POINTS * 2 + 6) as f64;
        assert_eq!(bounds[0], AxisBounds { min: 0.0, max: last });
        assert_eq!(bounds[1], AxisBounds { min: -last, max: 0.0 });
    }

    #[test]
    fn empty_cloud_has_zero_bounds() {
        assert_eq!(rotated_bounds(&[], 1.0), [AxisBounds::ZERO; 3]);
    }

    #[test]
    fn lerp_hits_both_ends_exactly() {
        let bounds = AxisBounds { min: -3.7, max: 12.9 };
        assert_eq!(bounds.lerp(0.0), -3.7);
        assert_eq!(bounds.lerp(1.0), 12.9);
    }
}
