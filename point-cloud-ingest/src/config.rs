/// Load options recognised by the ingest pipeline
use constants::render_settings::DEFAULT_MAX_POINTS;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadOptions {
    /// Project lon/lat degrees to local metres. When false, coordinates are
    /// assumed metric already and are only centred.
    pub is_geographic: bool,
    /// Subsampling budget; larger files are strided down to about this many points.
    pub max_points: usize,
    /// Decode on a worker thread, falling back to the calling thread.
    pub use_worker: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            is_geographic: true,
            max_points: DEFAULT_MAX_POINTS,
            use_worker: true,
        }
    }
}

impl LoadOptions {
    /// Read options from a JSON document; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
