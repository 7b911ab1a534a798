/// Subsampling budget applied when a file holds more points than this.
pub const DEFAULT_MAX_POINTS: usize = 2_000_000;

/// Quiet period before a burst of slice changes is recomputed.
pub const SLICE_DEBOUNCE_MS: u64 = 50;

/// Smallest gap kept between the min and max of a slice range (percent).
pub const SLICE_MIN_GAP: f64 = 1.0;

pub const DEFAULT_POINT_SIZE: f32 = 2.0;
pub const DEFAULT_OPACITY: f32 = 1.0;

/// Number of progress notifications emitted over a full decode pass.
pub const PROGRESS_STEPS: usize = 100;

/// Progress share reserved for LAZ header and engine setup.
pub const DECOMPRESS_SETUP_PERCENT: f32 = 15.0;

/// Divisor for the per-point progress interval during decompression.
pub const DECOMPRESS_PROGRESS_STEPS: u64 = 85;
