use constants::render_settings::{DEFAULT_OPACITY, DEFAULT_POINT_SIZE, SLICE_DEBOUNCE_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Presentation settings carried by a session across loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSettings {
    pub point_size: f32,
    pub opacity: f32,
    /// Quiet period before a burst of slice changes is recomputed.
    pub debounce_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            point_size: DEFAULT_POINT_SIZE,
            opacity: DEFAULT_OPACITY,
            debounce_ms: SLICE_DEBOUNCE_MS,
        }
    }
}

impl SessionSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
