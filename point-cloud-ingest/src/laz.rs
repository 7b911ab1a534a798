/// LAZ payload decompression into an equivalent uncompressed LAS buffer.
///
/// The decompression engine sits behind [`DecompressionEngine`] so the
/// reconstruction logic does not depend on a particular laszip binding.
use crate::cursor::{read_u8, read_u16, read_u32};
use crate::error::{IngestError, Result};
use crate::header::{Version, check_signature, read_point_count, read_version, read_vlrs};
use crate::progress::{PHASE_DECOMPRESSING, ProgressSink, report_interval};
use constants::las_layout::{self as layout, COMPRESSION_BITS, LASZIP_RECORD_ID, LASZIP_USER_ID};
use constants::render_settings::{DECOMPRESS_PROGRESS_STEPS, DECOMPRESS_SETUP_PERCENT};
use ::laz::{LasZipDecompressor, LazVlr};
use std::io::Cursor;

/// Upper bound on how many output bytes one compressed byte is assumed to
/// yield when pre-sizing the reconstructed buffer.
const MAX_EXPANSION: usize = 16;

/// The header fields needed to rebuild an uncompressed container.
///
/// Read independently of [`crate::header::parse_header`] because
/// decompression starts before the record decoder commits to a stride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressedLayout {
    pub version: Version,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_vlrs: u32,
    /// Raw format byte, compression bits included.
    pub point_format_byte: u8,
    pub point_record_length: u16,
    pub point_count: u64,
}

impl CompressedLayout {
    pub fn read(buffer: &[u8]) -> Result<Self> {
        check_signature(buffer)?;
        let version = read_version(buffer)?;
        let header_size = read_u16(buffer, layout::HEADER_SIZE, "header_size")?;
        Ok(Self {
            version,
            header_size,
            offset_to_point_data: read_u32(
                buffer,
                layout::OFFSET_TO_POINT_DATA,
                "offset_to_point_data",
            )?,
            number_of_vlrs: read_u32(buffer, layout::NUMBER_OF_VLRS, "number_of_vlrs")?,
            point_format_byte: read_u8(buffer, layout::POINT_FORMAT, "point_format")?,
            point_record_length: read_u16(
                buffer,
                layout::POINT_RECORD_LENGTH,
                "point_record_length",
            )?,
            point_count: read_point_count(buffer, version, header_size)?,
        })
    }

    pub fn point_format(&self) -> u8 {
        self.point_format_byte & !COMPRESSION_BITS
    }
}

/// True when the format byte carries the LAZ compression flag.
pub fn is_compressed(buffer: &[u8]) -> bool {
    buffer
        .get(layout::POINT_FORMAT)
        .is_some_and(|format| format & COMPRESSION_BITS != 0)
}

/// An open decompression stream yielding one raw point record at a time.
pub trait DecompressionHandle {
    fn point_count(&self) -> u64;
    fn record_length(&self) -> usize;
    /// Decode the next record into `out`, which holds `record_length` bytes.
    fn next_point(&mut self, out: &mut [u8]) -> Result<()>;
}

/// A capability that can open a LAZ container held in memory.
pub trait DecompressionEngine {
    fn open<'a>(&self, buffer: &'a [u8]) -> Result<Box<dyn DecompressionHandle + 'a>>;
}

/// Engine backed by the pure-Rust `laz` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaszipEngine;

struct LaszipHandle<'a> {
    decompressor: LasZipDecompressor<'a, Cursor<&'a [u8]>>,
    point_count: u64,
    record_length: usize,
}

impl DecompressionEngine for LaszipEngine {
    fn open<'a>(&self, buffer: &'a [u8]) -> Result<Box<dyn DecompressionHandle + 'a>> {
        let layout = CompressedLayout::read(buffer)?;
        let vlrs = read_vlrs(buffer, layout.header_size, layout.number_of_vlrs)?;
        let laszip = vlrs
            .iter()
            .find(|vlr| vlr.user_id == LASZIP_USER_ID && vlr.record_id == LASZIP_RECORD_ID)
            .ok_or(IngestError::LaszipVlrMissing)?;

        let vlr = LazVlr::from_buffer(&buffer[laszip.data.clone()])?;
        let record_length = vlr.items_size() as usize;

        // chunk table offsets are absolute, so the cursor spans the whole file
        let mut source = Cursor::new(buffer);
        source.set_position(u64::from(layout.offset_to_point_data));
        let decompressor = LasZipDecompressor::new(source, vlr)?;

        Ok(Box::new(LaszipHandle {
            decompressor,
            point_count: layout.point_count,
            record_length,
        }))
    }
}

impl DecompressionHandle for LaszipHandle<'_> {
    fn point_count(&self) -> u64 {
        self.point_count
    }

    fn record_length(&self) -> usize {
        self.record_length
    }

    fn next_point(&mut self, out: &mut [u8]) -> Result<()> {
        self.decompressor
            .decompress_one(out)
            .map_err(|e| IngestError::Decompression(e.to_string()))
    }
}

/// Rebuild an uncompressed LAS buffer from a LAZ buffer.
///
/// The bytes before the point data are copied verbatim except for the
/// compression bits of the format byte, which are cleared. Points follow as
/// flat records. All-or-nothing: any engine failure discards the output.
pub fn decompress(
    buffer: &[u8],
    engine: &dyn DecompressionEngine,
    progress: &dyn ProgressSink,
) -> Result<Vec<u8>> {
    progress.report(0.0, PHASE_DECOMPRESSING);
    let layout = CompressedLayout::read(buffer)?;
    let data_start = layout.offset_to_point_data as usize;
    let preamble = buffer.get(..data_start).ok_or(IngestError::Truncated {
        field: "offset_to_point_data",
        offset: layout::OFFSET_TO_POINT_DATA,
        needed: data_start,
        len: buffer.len(),
    })?;

    log::info!(
        "Decompressing LAZ {}: format {}, {} points",
        layout.version,
        layout.point_format(),
        layout.point_count
    );
    progress.report(DECOMPRESS_SETUP_PERCENT / 2.0, PHASE_DECOMPRESSING);

    // The handle and the scratch record live only inside this scope and are
    // released on every exit, including a failed `next_point`.
    let output = {
        let mut handle = engine.open(buffer)?;
        progress.report(DECOMPRESS_SETUP_PERCENT, PHASE_DECOMPRESSING);

        let count = handle.point_count();
        let record_length = handle.record_length();
        let stride = usize::from(layout.point_record_length);
        if record_length > usize::from(u16::MAX) {
            return Err(IngestError::Decompression(format!(
                "laszip record length {record_length} exceeds the LAS maximum"
            )));
        }
        if record_length != stride {
            log::warn!(
                "laszip record length {} differs from header record length {}, \
                 records are resized to the header length",
                record_length,
                stride
            );
        }

        let body = usize::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(stride))
            .ok_or_else(|| {
                IngestError::Decompression(format!("{count} points do not fit in memory"))
            })?;
        // the declared count is untrusted, so the up-front reservation is bounded
        // by what the compressed payload could plausibly expand to
        let reserve = data_start + body.min(buffer.len().saturating_mul(MAX_EXPANSION));
        let mut output = Vec::new();
        output.try_reserve_exact(reserve).map_err(|e| {
            IngestError::Decompression(format!("cannot allocate {reserve} bytes: {e}"))
        })?;
        output.extend_from_slice(preamble);
        if let Some(format) = output.get_mut(layout::POINT_FORMAT) {
            *format &= !COMPRESSION_BITS;
        }

        let mut scratch = vec![0u8; record_length];
        let interval = report_interval(count, DECOMPRESS_PROGRESS_STEPS);
        let span = 100.0 - DECOMPRESS_SETUP_PERCENT;

        for index in 0..count {
            handle.next_point(&mut scratch)?;
            let keep = record_length.min(stride);
            output.try_reserve(stride).map_err(|e| {
                IngestError::Decompression(format!("output grew past available memory: {e}"))
            })?;
            output.extend_from_slice(&scratch[..keep]);
            output.resize(output.len() + (stride - keep), 0);

            if index % interval == 0 {
                let percent = DECOMPRESS_SETUP_PERCENT + span * index as f32 / count as f32;
                progress.report(percent, PHASE_DECOMPRESSING);
            }
        }

        output
    };

    progress.report(100.0, PHASE_DECOMPRESSING);
    Ok(output)
}
