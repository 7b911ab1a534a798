use constants::render_settings::SLICE_MIN_GAP;
use serde::{Deserialize, Serialize};

const PERCENT_MIN: f64 = 0.0;
const PERCENT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Percentage window `[min, max]` along one axis. `min < max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRange")]
pub struct AxisRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl From<RawRange> for AxisRange {
    fn from(raw: RawRange) -> Self {
        AxisRange::new(raw.min, raw.max)
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: PERCENT_MIN,
            max: PERCENT_MAX,
        }
    }
}

impl AxisRange {
    /// Build a range by applying `min` then `max` to the full window.
    pub fn new(min: f64, max: f64) -> Self {
        let mut range = Self::default();
        range.set_min(min);
        range.set_max(max);
        range
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.min <= PERCENT_MIN && self.max >= PERCENT_MAX
    }

    /// A min at or past `max` lands one gap below it instead.
    pub fn set_min(&mut self, value: f64) {
        let value = clamp_percent(value);
        if value < self.max {
            self.min = value;
            return;
        }
        self.min = (self.max - SLICE_MIN_GAP).max(PERCENT_MIN);
        if self.max - self.min < SLICE_MIN_GAP {
            self.max = self.min + SLICE_MIN_GAP;
        }
    }

    /// A max at or below `min` lands one gap above it instead.
    pub fn set_max(&mut self, value: f64) {
        let value = clamp_percent(value);
        if value > self.min {
            self.max = value;
            return;
        }
        self.max = (self.min + SLICE_MIN_GAP).min(PERCENT_MAX);
        if self.max - self.min < SLICE_MIN_GAP {
            self.min = self.max - SLICE_MIN_GAP;
        }
    }

    /// Fractions of the axis span covered by this window.
    pub fn fractions(&self) -> (f64, f64) {
        (self.min / PERCENT_MAX, self.max / PERCENT_MAX)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return PERCENT_MIN;
    }
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_everything() {
        let range = AxisRange::default();
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 100.0);
        assert!(range.is_full());
    }

    #[test]
    fn crossing_min_keeps_one_unit_gap() {
        let mut range = AxisRange::new(10.0, 40.0);
        range.set_min(55.0);
        assert_eq!(range.min(), 39.0);
        assert_eq!(range.max(), 40.0);
    }

    #[test]
    fn crossing_max_keeps_one_unit_gap() {
        let mut range = AxisRange::new(30.0, 80.0);
        range.set_max(30.0);
        assert_eq!(range.min(), 30.0);
        assert_eq!(range.max(), 31.0);
    }

    #[test]
    fn inverted_construction_is_repaired() {
        let range = AxisRange::new(60.0, 40.0);
        assert!(range.min() < range.max());
        assert_eq!(range.max() - range.min(), 1.0);
    }

    #[test]
    fn edges_of_the_window_are_respected() {
        let mut range = AxisRange::default();
        range.set_min(100.0);
        assert_eq!((range.min(), range.max()), (99.0, 100.0));

        let mut range = AxisRange::default();
        range.set_max(-5.0);
        assert_eq!((range.min(), range.max()), (0.0, 1.0));

        let mut range = AxisRange::new(99.5, 100.0);
        range.set_max(10.0);
        assert_eq!((range.min(), range.max()), (99.0, 100.0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let range = AxisRange::new(-20.0, 250.0);
        assert!(range.is_full());
        let range = AxisRange::new(f64::NAN, 50.0);
        assert_eq!(range.min(), 0.0);
    }

    #[test]
    fn deserialising_repairs_inverted_ranges() {
        let range: AxisRange = serde_json::from_str(r#"{"min": 70.0, "max": 20.0}"#).unwrap();
        assert!(range.min() < range.max());
    }
}
