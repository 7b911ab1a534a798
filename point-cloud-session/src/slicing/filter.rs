use rayon::prelude::*;

use super::bounds::{AxisBounds, rotate_xy};

/// Derived buffers holding the points that survived a slice, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredPoints {
    pub positions: Vec<f32>,
    pub colours: Vec<f32>,
}

impl FilteredPoints {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Keep every point whose rotated position lies inside `window` on all three
/// axes. Survivors keep their local coordinates; their colour is replaced by
/// `colour_override` when one is set.
pub fn filter_points(
    positions: &[f32],
    colours: &[f32],
    window: &[AxisBounds; 3],
    angle_rad: f64,
    colour_override: Option<[f32; 3]>,
) -> FilteredPoints {
    let kept: Vec<([f32; 3], [f32; 3])> = positions
        .par_chunks_exact(3)
        .zip(colours.par_chunks_exact(3))
        .filter_map(|(point, colour)| {
            let world = rotate_xy(point, angle_rad);
            let inside = window
                .iter()
                .zip(world)
                .all(|(bounds, value)| bounds.contains(value));
            inside.then(|| {
                let colour = colour_override.unwrap_or([colour[0], colour[1], colour[2]]);
                ([point[0], point[1], point[2]], colour)
            })
        })
        .collect();

    let mut filtered = FilteredPoints {
        positions: Vec::with_capacity(kept.len() * 3),
        colours: Vec::with_capacity(kept.len() * 3),
    };
    for (position, colour) in kept {
        filtered.positions.extend_from_slice(&position);
        filtered.colours.extend_from_slice(&colour);
    }
    filtered
}
