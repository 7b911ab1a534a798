/// Sink for everything the renderer needs from a session.
///
/// Buffers are flat `[x, y, z, ...]` positions and `[r, g, b, ...]` colours in
/// `[0, 1]`. Rotation about the up axis is applied at draw time, so buffers
/// always stay in the unrotated local frame.
pub trait RenderSurface {
    fn set_buffers(&mut self, positions: &[f32], colours: &[f32]);
    fn set_point_size(&mut self, size: f32);
    fn set_opacity(&mut self, opacity: f32);
    fn set_rotation(&mut self, angle_rad: f64);
}

/// Surface that keeps the last values it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub positions: Vec<f32>,
    pub colours: Vec<f32>,
    pub point_size: f32,
    pub opacity: f32,
    pub rotation: f64,
    /// Number of buffer uploads seen so far.
    pub uploads: usize,
}

impl RecordingSurface {
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }
}

impl RenderSurface for RecordingSurface {
    fn set_buffers(&mut self, positions: &[f32], colours: &[f32]) {
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.colours.clear();
        self.colours.extend_from_slice(colours);
        self.uploads += 1;
    }

    fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn set_rotation(&mut self, angle_rad: f64) {
        self.rotation = angle_rad;
    }
}
