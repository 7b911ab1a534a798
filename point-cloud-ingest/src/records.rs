/// Point record iteration: stride subsampling, de-quantization and RGB extraction
use crate::bounds::GeodeticBounds;
use crate::cursor::{read_i32, read_u16};
use crate::header::LasHeader;
use crate::progress::{PHASE_READING_POINTS, ProgressSink, report_interval};
use constants::las_layout::COORDINATE_BYTES;
use constants::render_settings::PROGRESS_STEPS;

/// Points retained from one pass over the record array.
#[derive(Debug, Clone, Default)]
pub struct DecodedPoints {
    /// lon, lat, elevation per retained point.
    pub geodetic: Vec<[f64; 3]>,
    /// Raw RGB block per retained point, `None` when the format has none.
    pub raw_colours: Vec<Option<[u16; 3]>>,
    pub bounds: GeodeticBounds,
    /// Record stride used for subsampling.
    pub step: usize,
    /// True when the buffer ended before every sampled record was read.
    pub truncated: bool,
}

impl DecodedPoints {
    pub fn len(&self) -> usize {
        self.geodetic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geodetic.is_empty()
    }
}

/// Uniform stride that keeps at most `max_points` out of `total`.
pub fn sample_step(total: u64, max_points: usize) -> usize {
    if max_points > 0 && total > max_points as u64 {
        total.div_ceil(max_points as u64) as usize
    } else {
        1
    }
}

/// Decode every `step`-th record of the point array in a single pass.
///
/// A record that would run past the end of the buffer ends the pass early;
/// the file is treated as loaded up to that point. Reports the first half
/// (0-50%) of the decode progress range.
pub fn decode_points(
    buffer: &[u8],
    header: &LasHeader,
    max_points: usize,
    progress: &dyn ProgressSink,
) -> DecodedPoints {
    let step = sample_step(header.point_count, max_points);
    let expected = header.point_count.div_ceil(step as u64) as usize;
    let capacity = expected.min(buffer.len() / usize::from(header.point_record_length.max(1)) + 1);
    let interval = report_interval(expected as u64, PROGRESS_STEPS as u64) as usize;

    let record_length = usize::from(header.point_record_length);
    let data_start = header.offset_to_point_data as usize;
    let colour_offset = header.colour_offset();

    let mut decoded = DecodedPoints {
        geodetic: Vec::with_capacity(capacity),
        raw_colours: Vec::with_capacity(capacity),
        bounds: GeodeticBounds::new(),
        step,
        truncated: false,
    };

    log::debug!(
        "Decoding {} of {} records (step {}, record length {})",
        expected,
        header.point_count,
        step,
        record_length
    );

    for sample in 0..expected {
        let index = sample as u64 * step as u64;
        let record_start = index
            .checked_mul(record_length as u64)
            .and_then(|offset| offset.checked_add(data_start as u64))
            .and_then(|offset| usize::try_from(offset).ok());
        let Some(record_start) = record_start.filter(|&at| at + COORDINATE_BYTES <= buffer.len())
        else {
            log::warn!(
                "Point data ends after {} of {} sampled records",
                decoded.len(),
                expected
            );
            decoded.truncated = true;
            break;
        };

        let raw = [
            read_i32(buffer, record_start, "x").unwrap_or_default(),
            read_i32(buffer, record_start + 4, "y").unwrap_or_default(),
            read_i32(buffer, record_start + 8, "z").unwrap_or_default(),
        ];
        let [lon, lat, elevation] = header.dequantize(raw);
        decoded.bounds.update(lon, lat, elevation);
        decoded.geodetic.push([lon, lat, elevation]);
        decoded
            .raw_colours
            .push(colour_offset.and_then(|at| read_rgb(buffer, record_start + at)));

        if sample % interval == 0 {
            progress.report(50.0 * sample as f32 / expected as f32, PHASE_READING_POINTS);
        }
    }

    progress.report(50.0, PHASE_READING_POINTS);
    decoded
}

fn read_rgb(buffer: &[u8], at: usize) -> Option<[u16; 3]> {
    Some([
        read_u16(buffer, at, "red").ok()?,
        read_u16(buffer, at + 2, "green").ok()?,
        read_u16(buffer, at + 4, "blue").ok()?,
    ])
}
