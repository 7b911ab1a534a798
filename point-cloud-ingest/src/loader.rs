/// Load pipeline: decompress, decode, project and colour a point cloud.
///
/// [`load_points`] is the single implementation. The threaded backend only
/// moves that call onto a worker thread, so both backends produce identical
/// output for the same input.
use crate::bounds::GeodeticBounds;
use crate::colour::colourise;
use crate::config::LoadOptions;
use crate::coordinates::{MetricExtent, center_planar, centroid, metric_extent, project_to_enu};
use crate::error::{IngestError, Result};
use crate::header::{LasHeader, Validation, parse_header, validate};
use crate::laz::{DecompressionEngine, LaszipEngine, decompress, is_compressed};
use crate::progress::{PHASE_READING_FILE, ProgressSink};
use crate::records::decode_points;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Derived header fields computed after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total_points: u64,
    pub loaded_points: usize,
    pub step: usize,
    pub geodetic_bounds: GeodeticBounds,
    pub center: [f64; 3],
    pub extent: MetricExtent,
    pub was_compressed: bool,
    pub truncated: bool,
}

/// Renderer-ready point set: interleaved xyz positions and rgb colours.
#[derive(Debug, Clone)]
pub struct PointCloudData {
    pub header: LasHeader,
    pub summary: LoadSummary,
    pub positions: Vec<f32>,
    pub colours: Vec<f32>,
    /// True if any point kept its recorded colour.
    pub has_colour: bool,
}

impl PointCloudData {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Where the decode runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Threaded,
    Inline,
}

impl Backend {
    pub fn from_options(options: &LoadOptions) -> Self {
        if options.use_worker {
            Backend::Threaded
        } else {
            Backend::Inline
        }
    }
}

/// Decode a LAS or LAZ buffer on the calling thread.
pub fn load_points(
    bytes: &[u8],
    options: &LoadOptions,
    progress: &dyn ProgressSink,
) -> Result<PointCloudData> {
    load_points_with_engine(bytes, &LaszipEngine, options, progress)
}

/// [`load_points`] with a caller-supplied LAZ engine.
pub fn load_points_with_engine(
    bytes: &[u8],
    engine: &dyn DecompressionEngine,
    options: &LoadOptions,
    progress: &dyn ProgressSink,
) -> Result<PointCloudData> {
    let was_compressed = is_compressed(bytes);
    let decompressed;
    let buffer: &[u8] = if was_compressed {
        decompressed = decompress(bytes, engine, progress)?;
        &decompressed
    } else {
        bytes
    };

    let header = parse_header(buffer)?;
    log::info!(
        "LAS {} point format {}: {} points, record length {}",
        header.version,
        header.point_format,
        header.point_count,
        header.point_record_length
    );

    let decoded = decode_points(buffer, &header, options.max_points, progress);
    let center = centroid(&decoded.geodetic);
    let positions = if options.is_geographic {
        project_to_enu(&decoded.geodetic, center)
    } else {
        center_planar(&decoded.geodetic, center)
    };
    let (colours, has_colour) = colourise(
        decoded.geodetic.iter().map(|point| point[2]),
        &decoded.raw_colours,
        &decoded.bounds,
        progress,
    );

    let summary = LoadSummary {
        total_points: header.point_count,
        loaded_points: decoded.len(),
        step: decoded.step,
        geodetic_bounds: decoded.bounds,
        center,
        extent: metric_extent(&decoded.bounds, options.is_geographic),
        was_compressed,
        truncated: decoded.truncated,
    };
    log::info!(
        "Loaded {} points (step {}), extent {:.1} x {:.1} x {:.1} m",
        summary.loaded_points,
        summary.step,
        summary.extent.east_west,
        summary.extent.north_south,
        summary.extent.up_down
    );

    Ok(PointCloudData {
        header,
        summary,
        positions,
        colours,
        has_colour,
    })
}

/// A decode in flight. Dropping it abandons the worker; its result is discarded.
pub enum PendingLoad {
    Worker(JoinHandle<Result<PointCloudData>>),
    Ready(Result<PointCloudData>),
}

impl PendingLoad {
    pub fn is_finished(&self) -> bool {
        match self {
            PendingLoad::Worker(handle) => handle.is_finished(),
            PendingLoad::Ready(_) => true,
        }
    }

    /// Block until the decode completes.
    pub fn wait(self) -> Result<PointCloudData> {
        match self {
            PendingLoad::Worker(handle) => handle
                .join()
                .map_err(|payload| IngestError::WorkerPanicked(panic_message(payload.as_ref())))?,
            PendingLoad::Ready(result) => result,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Start a decode with the requested backend.
///
/// The threaded backend falls back to decoding inline if the worker thread
/// cannot be spawned.
pub fn spawn_load(
    bytes: Vec<u8>,
    options: LoadOptions,
    progress: Arc<dyn ProgressSink>,
) -> PendingLoad {
    if Backend::from_options(&options) == Backend::Inline {
        return PendingLoad::Ready(load_points(&bytes, &options, progress.as_ref()));
    }

    let shared = Arc::new(bytes);
    let spawned = {
        let bytes = Arc::clone(&shared);
        let options = options.clone();
        let progress = Arc::clone(&progress);
        thread::Builder::new()
            .name("point-cloud-decode".to_string())
            .spawn(move || load_points(&bytes, &options, progress.as_ref()))
    };

    match spawned {
        Ok(handle) => PendingLoad::Worker(handle),
        Err(err) => {
            log::warn!("Decode worker unavailable ({err}), decoding on the calling thread");
            PendingLoad::Ready(load_points(&shared, &options, progress.as_ref()))
        }
    }
}

/// Decode an in-memory buffer and wait for the result.
pub fn load(
    bytes: Vec<u8>,
    options: LoadOptions,
    progress: Arc<dyn ProgressSink>,
) -> Result<PointCloudData> {
    spawn_load(bytes, options, progress).wait()
}

/// Read a file into memory, then decode it.
pub fn load_file(
    path: &Path,
    options: LoadOptions,
    progress: Arc<dyn ProgressSink>,
) -> Result<PointCloudData> {
    progress.report(0.0, PHASE_READING_FILE);
    let bytes = std::fs::read(path)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    load(bytes, options, progress)
}

/// Pre-flight check of a file using only its header bytes.
pub fn validate_file(path: &Path, max_points: usize) -> Result<Validation> {
    let mut prefix = Vec::new();
    std::fs::File::open(path)?
        .take(u64::from(u16::MAX) + 1)
        .read_to_end(&mut prefix)?;
    validate(&prefix, max_points)
}
