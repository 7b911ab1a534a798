use super::bounds::rotated_bounds;
use super::filter::{FilteredPoints, filter_points};
use super::range::Axis;
use super::state::{SliceKey, SliceState};

/// What the renderer should show after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceView {
    /// Nothing changed on screen.
    Unchanged,
    /// Show the canonical buffers again.
    Original,
    /// Show the engine's filtered buffers.
    Filtered,
}

/// Slice state machine over one loaded cloud.
///
/// Inactive shows the canonical buffers; active shows a filtered copy. The
/// canonical buffers are borrowed per call and never written.
#[derive(Debug, Clone)]
pub struct SliceEngine {
    state: SliceState,
    original_count: usize,
    last_applied: Option<SliceKey>,
    filtered: Option<FilteredPoints>,
}

impl SliceEngine {
    /// Fresh engine for a newly loaded cloud, bounds taken at `rotation`.
    pub fn new(positions: &[f32], rotation: f64) -> Self {
        let state = SliceState {
            world_bounds: rotated_bounds(positions, rotation),
            ..SliceState::default()
        };
        Self {
            state,
            original_count: positions.len() / 3,
            last_applied: None,
            filtered: None,
        }
    }

    pub fn state(&self) -> &SliceState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Points currently on screen.
    pub fn displayed_count(&self) -> usize {
        self.filtered
            .as_ref()
            .map_or(self.original_count, FilteredPoints::len)
    }

    /// Filtered buffers, if the active view is showing them.
    pub fn filtered(&self) -> Option<&FilteredPoints> {
        self.filtered.as_ref()
    }

    pub fn enable(&mut self) {
        if !self.state.enabled {
            self.state.enabled = true;
            self.last_applied = None;
        }
    }

    /// Deactivate. Returns [`SliceView::Original`] when the screen differs
    /// from the source: fewer points, or override colours on every point.
    pub fn disable(&mut self) -> SliceView {
        if !self.state.enabled {
            return SliceView::Unchanged;
        }
        self.state.enabled = false;
        let recoloured = self.filtered.is_some()
            && self
                .last_applied
                .is_some_and(|key| key.colour_override.is_some());
        let restore = recoloured || self.displayed_count() != self.original_count;
        self.filtered = None;
        if restore {
            log::debug!("Slicing off, restoring {} points", self.original_count);
            SliceView::Original
        } else {
            SliceView::Unchanged
        }
    }

    pub fn set_range(&mut self, axis: Axis, min: f64, max: f64) {
        let range = self.state.range_mut(axis);
        range.set_min(min);
        range.set_max(max);
    }

    pub fn set_min(&mut self, axis: Axis, value: f64) {
        self.state.range_mut(axis).set_min(value);
    }

    pub fn set_max(&mut self, axis: Axis, value: f64) {
        self.state.range_mut(axis).set_max(value);
    }

    /// Refresh the world bounds after the cloud was rotated.
    pub fn update_rotation(&mut self, positions: &[f32], rotation: f64) {
        self.state.world_bounds = rotated_bounds(positions, rotation);
    }

    pub fn key(&self, rotation: f64, colour_override: Option<[f32; 3]>) -> SliceKey {
        SliceKey {
            enabled: self.state.enabled,
            ranges: self.state.ranges,
            colour_override,
            rotation,
        }
    }

    /// Whether a recompute with these inputs would change anything.
    pub fn is_stale(&self, rotation: f64, colour_override: Option<[f32; 3]>) -> bool {
        self.state.enabled && self.last_applied != Some(self.key(rotation, colour_override))
    }

    /// Rebuild the filtered buffers if the inputs changed since the last run.
    pub fn recompute(
        &mut self,
        positions: &[f32],
        colours: &[f32],
        rotation: f64,
        colour_override: Option<[f32; 3]>,
    ) -> SliceView {
        if !self.is_stale(rotation, colour_override) {
            return SliceView::Unchanged;
        }
        let window = self.state.world_window();
        let filtered = filter_points(positions, colours, &window, rotation, colour_override);
        log::debug!(
            "Slice kept {} of {} points",
            filtered.len(),
            self.original_count
        );
        self.filtered = Some(filtered);
        self.last_applied = Some(self.key(rotation, colour_override));
        SliceView::Filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10x10 grid on the ground plane, z rising with x.
    fn grid() -> (Vec<f32>, Vec<f32>) {
        let mut positions = Vec::new();
        let mut colours = Vec::new();
        for x in 0..10 {
            for y in 0..10 {
                positions.extend_from_slice(&[x as f32, y as f32, x as f32 * 0.5]);
                colours.extend_from_slice(&[0.1, 0.2, 0.3]);
            }
        }
        (positions, colours)
    }

    #[test]
    fn inactive_engine_never_recomputes() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);
        engine.set_range(Axis::X, 0.0, 50.0);
        assert_eq!(engine.recompute(&positions, &colours, 0.0, None), SliceView::Unchanged);
        assert_eq!(engine.displayed_count(), 100);
    }

    #[test]
    fn same_key_is_skipped() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);
        engine.enable();
        engine.set_range(Axis::X, 0.0, 50.0);
        assert_eq!(engine.recompute(&positions, &colours, 0.0, None), SliceView::Filtered);
        assert_eq!(engine.recompute(&positions, &colours, 0.0, None), SliceView::Unchanged);
        assert_eq!(
            engine.recompute(&positions, &colours, 0.0, Some([1.0, 0.0, 0.0])),
            SliceView::Filtered
        );
    }

    #[test]
    fn half_the_x_span_keeps_half_the_grid() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);
        engine.enable();
        // x in [0, 4.5] keeps columns 0..=4.
        engine.set_range(Axis::X, 0.0, 50.0);
        engine.recompute(&positions, &colours, 0.0, None);
        assert_eq!(engine.displayed_count(), 50);
    }

    #[test]
    fn disable_restores_only_when_filtered_count_differs() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);

        engine.enable();
        engine.recompute(&positions, &colours, 0.0, None);
        assert_eq!(engine.displayed_count(), 100);
        assert_eq!(engine.disable(), SliceView::Unchanged);

        engine.enable();
        engine.set_range(Axis::Y, 20.0, 60.0);
        engine.recompute(&positions, &colours, 0.0, None);
        assert!(engine.displayed_count() < 100);
        assert_eq!(engine.disable(), SliceView::Original);
        assert_eq!(engine.displayed_count(), 100);
        assert_eq!(engine.disable(), SliceView::Unchanged);
    }

    #[test]
    fn disable_restores_override_colours_on_a_full_slice() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);
        engine.enable();
        engine.recompute(&positions, &colours, 0.0, Some([1.0, 0.0, 0.0]));
        assert_eq!(engine.displayed_count(), 100);
        assert_eq!(engine.disable(), SliceView::Original);

        // without an override a full slice is already what the source shows
        engine.enable();
        engine.recompute(&positions, &colours, 0.0, None);
        assert_eq!(engine.disable(), SliceView::Unchanged);
    }

    #[test]
    fn re_enabling_reproduces_the_same_subset() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.3);
        engine.enable();
        engine.set_range(Axis::X, 10.0, 70.0);
        engine.set_range(Axis::Z, 5.0, 95.0);
        engine.recompute(&positions, &colours, 0.3, None);
        let first = engine.filtered().cloned();

        engine.disable();
        engine.enable();
        assert_eq!(engine.recompute(&positions, &colours, 0.3, None), SliceView::Filtered);
        assert_eq!(engine.filtered().cloned(), first);
    }

    #[test]
    fn full_ranges_keep_every_point_at_any_rotation() {
        let (positions, colours) = grid();
        for rotation in [0.0, 0.7, 2.0, -1.3] {
            let mut engine = SliceEngine::new(&positions, rotation);
            engine.enable();
            engine.recompute(&positions, &colours, rotation, None);
            assert_eq!(engine.displayed_count(), 100, "rotation {rotation}");
        }
    }

    #[test]
    fn rotation_changes_the_key() {
        let (positions, colours) = grid();
        let mut engine = SliceEngine::new(&positions, 0.0);
        engine.enable();
        engine.recompute(&positions, &colours, 0.0, None);
        assert!(!engine.is_stale(0.0, None));
        engine.update_rotation(&positions, 1.0);
        assert!(engine.is_stale(1.0, None));
    }
}
