//! LAS/LAZ ingestion: header and record decoding, LAZ reconstruction,
//! local tangent-plane projection and elevation colouring.
pub mod bounds;
pub mod colour;
pub mod config;
pub mod coordinates;
pub mod cursor;
pub mod error;
pub mod header;
pub mod laz;
pub mod loader;
pub mod progress;
pub mod records;

#[cfg(any(test, feature = "fixtures"))]
#[doc(hidden)]
pub mod fixtures;

pub use config::LoadOptions;
pub use error::{IngestError, Result};
pub use header::{LasHeader, Validation, parse_header, validate};
pub use loader::{
    Backend, LoadSummary, PendingLoad, PointCloudData, load, load_file, load_points, spawn_load,
};
pub use progress::{NoProgress, ProgressSink};
