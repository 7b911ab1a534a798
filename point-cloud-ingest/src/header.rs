/// LAS public header block parsing and pre-flight validation
use crate::cursor::{read_f64, read_u8, read_u16, read_u32};
use crate::error::{IngestError, Result};
use constants::las_layout::{self as layout, COMPRESSION_BITS, LAS_SIGNATURE};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// LAS format revision, e.g. 1.2 or 1.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parsed public header. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LasHeader {
    pub version: Version,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_vlrs: u32,
    /// Point format code with the compression bits masked off.
    pub point_format: u8,
    /// Whether the on-disk format byte carried the LAZ compression bits.
    pub compressed: bool,
    pub point_record_length: u16,
    pub legacy_point_count: u32,
    /// Resolved point count, see [`resolve_point_count`].
    pub point_count: u64,
    pub scale: [f64; 3],
    pub offset: [f64; 3],
    /// Bounds as declared by the writer, in file coordinates.
    pub declared_min: [f64; 3],
    pub declared_max: [f64; 3],
}

impl LasHeader {
    /// Byte offset of the RGB block inside each record.
    /// The format must define one and the record must be long enough to hold it.
    pub fn colour_offset(&self) -> Option<usize> {
        layout::colour_offset(self.point_format)
            .filter(|offset| offset + 6 <= usize::from(self.point_record_length))
    }

    /// Convert a quantized coordinate triple to file coordinates.
    pub fn dequantize(&self, raw: [i32; 3]) -> [f64; 3] {
        [
            f64::from(raw[0]) * self.scale[0] + self.offset[0],
            f64::from(raw[1]) * self.scale[1] + self.offset[1],
            f64::from(raw[2]) * self.scale[2] + self.offset[2],
        ]
    }
}

/// Cheap pre-flight verdict produced without touching point records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub version: Version,
    pub point_count: u64,
    pub point_format: u8,
    pub compressed: bool,
    /// Rough memory needed to decode: raw records plus retained output buffers.
    pub estimated_bytes: u64,
}

/// A variable length record located inside the header region.
#[derive(Debug, Clone, PartialEq)]
pub struct Vlr {
    pub user_id: String,
    pub record_id: u16,
    /// Payload position within the source buffer.
    pub data: Range<usize>,
}

/// Select the legacy 32-bit or extended 64-bit point count.
///
/// The extended field wins only for version >= 1.4 headers that are long
/// enough to carry it and hold a nonzero value there.
pub fn resolve_point_count(
    version: Version,
    header_size: u16,
    legacy: u32,
    extended: Option<u64>,
) -> u64 {
    match extended {
        Some(count)
            if version.major >= 1
                && version.minor >= 4
                && header_size >= layout::EXTENDED_COUNT_MIN_HEADER_SIZE
                && count != 0 =>
        {
            count
        }
        _ => u64::from(legacy),
    }
}

pub(crate) fn check_signature(buffer: &[u8]) -> Result<()> {
    let signature = buffer.get(..4).ok_or(IngestError::Truncated {
        field: "signature",
        offset: 0,
        needed: 4,
        len: buffer.len(),
    })?;
    if signature != LAS_SIGNATURE {
        return Err(IngestError::InvalidSignature {
            found: String::from_utf8_lossy(signature).into_owned(),
        });
    }
    Ok(())
}

pub(crate) fn read_version(buffer: &[u8]) -> Result<Version> {
    Ok(Version {
        major: read_u8(buffer, layout::VERSION_MAJOR, "version_major")?,
        minor: read_u8(buffer, layout::VERSION_MINOR, "version_minor")?,
    })
}

/// Read the point count fields and apply the legacy/extended rule.
pub(crate) fn read_point_count(buffer: &[u8], version: Version, header_size: u16) -> Result<u64> {
    let legacy = read_u32(buffer, layout::LEGACY_POINT_COUNT, "legacy_point_count")?;
    let extended = if usize::from(header_size) >= layout::EXTENDED_POINT_COUNT_HIGH + 4 {
        let low = read_u32(buffer, layout::EXTENDED_POINT_COUNT_LOW, "extended_point_count")?;
        let high = read_u32(buffer, layout::EXTENDED_POINT_COUNT_HIGH, "extended_point_count")?;
        Some(u64::from(low) + u64::from(high) * (1u64 << 32))
    } else {
        None
    };
    Ok(resolve_point_count(version, header_size, legacy, extended))
}

fn ensure_header_present(buffer: &[u8], header_size: u16) -> Result<()> {
    let needed = usize::from(header_size).max(layout::MIN_HEADER_SIZE);
    if buffer.len() < needed {
        return Err(IngestError::Truncated {
            field: "header",
            offset: 0,
            needed,
            len: buffer.len(),
        });
    }
    Ok(())
}

/// Pre-flight check: signature, version and point count only.
///
/// Lets a caller reject or warn about a file before committing to a full
/// decode. `max_points` is the subsampling budget used for the estimate.
pub fn validate(buffer: &[u8], max_points: usize) -> Result<Validation> {
    check_signature(buffer)?;
    let header_size = read_u16(buffer, layout::HEADER_SIZE, "header_size")?;
    ensure_header_present(buffer, header_size)?;

    let version = read_version(buffer)?;
    let point_count = read_point_count(buffer, version, header_size)?;
    let format_byte = read_u8(buffer, layout::POINT_FORMAT, "point_format")?;
    let record_length = read_u16(buffer, layout::POINT_RECORD_LENGTH, "point_record_length")?;

    let retained = point_count.min(max_points as u64);
    let estimated_bytes = point_count
        .saturating_mul(u64::from(record_length))
        .saturating_add(retained.saturating_mul(24));

    Ok(Validation {
        version,
        point_count,
        point_format: format_byte & !COMPRESSION_BITS,
        compressed: format_byte & COMPRESSION_BITS != 0,
        estimated_bytes,
    })
}

/// Full fixed-offset extraction of the public header block.
pub fn parse_header(buffer: &[u8]) -> Result<LasHeader> {
    check_signature(buffer)?;
    let header_size = read_u16(buffer, layout::HEADER_SIZE, "header_size")?;
    ensure_header_present(buffer, header_size)?;

    let version = read_version(buffer)?;
    let format_byte = read_u8(buffer, layout::POINT_FORMAT, "point_format")?;

    Ok(LasHeader {
        version,
        header_size,
        offset_to_point_data: read_u32(
            buffer,
            layout::OFFSET_TO_POINT_DATA,
            "offset_to_point_data",
        )?,
        number_of_vlrs: read_u32(buffer, layout::NUMBER_OF_VLRS, "number_of_vlrs")?,
        point_format: format_byte & !COMPRESSION_BITS,
        compressed: format_byte & COMPRESSION_BITS != 0,
        point_record_length: read_u16(buffer, layout::POINT_RECORD_LENGTH, "point_record_length")?,
        legacy_point_count: read_u32(buffer, layout::LEGACY_POINT_COUNT, "legacy_point_count")?,
        point_count: read_point_count(buffer, version, header_size)?,
        scale: [
            read_f64(buffer, layout::X_SCALE, "x_scale")?,
            read_f64(buffer, layout::Y_SCALE, "y_scale")?,
            read_f64(buffer, layout::Z_SCALE, "z_scale")?,
        ],
        offset: [
            read_f64(buffer, layout::X_OFFSET, "x_offset")?,
            read_f64(buffer, layout::Y_OFFSET, "y_offset")?,
            read_f64(buffer, layout::Z_OFFSET, "z_offset")?,
        ],
        declared_min: [
            read_f64(buffer, layout::MIN_X, "min_x")?,
            read_f64(buffer, layout::MIN_Y, "min_y")?,
            read_f64(buffer, layout::MIN_Z, "min_z")?,
        ],
        declared_max: [
            read_f64(buffer, layout::MAX_X, "max_x")?,
            read_f64(buffer, layout::MAX_Y, "max_y")?,
            read_f64(buffer, layout::MAX_Z, "max_z")?,
        ],
    })
}

/// Walk the variable length records that follow the public header.
pub fn read_vlrs(buffer: &[u8], header_size: u16, count: u32) -> Result<Vec<Vlr>> {
    // every VLR takes at least a full header, so the buffer bounds a sane count
    let plausible =
        buffer.len().saturating_sub(usize::from(header_size)) / layout::VLR_HEADER_SIZE;
    let mut vlrs = Vec::with_capacity((count as usize).min(plausible));
    let mut cursor = usize::from(header_size);

    for _ in 0..count {
        let user_id_start = cursor + layout::VLR_USER_ID;
        let user_id_bytes = buffer
            .get(user_id_start..user_id_start + layout::VLR_USER_ID_LEN)
            .ok_or(IngestError::Truncated {
                field: "vlr_user_id",
                offset: user_id_start,
                needed: layout::VLR_USER_ID_LEN,
                len: buffer.len(),
            })?;
        let user_id = String::from_utf8_lossy(user_id_bytes)
            .trim_end_matches('\0')
            .to_string();
        let record_id = read_u16(buffer, cursor + layout::VLR_RECORD_ID, "vlr_record_id")?;
        let length = read_u16(buffer, cursor + layout::VLR_RECORD_LENGTH, "vlr_record_length")?;

        let data_start = cursor + layout::VLR_HEADER_SIZE;
        let data_end = data_start + usize::from(length);
        if data_end > buffer.len() {
            return Err(IngestError::Truncated {
                field: "vlr_data",
                offset: data_start,
                needed: usize::from(length),
                len: buffer.len(),
            });
        }

        vlrs.push(Vlr {
            user_id,
            record_id,
            data: data_start..data_end,
        });
        cursor = data_end;
    }

    Ok(vlrs)
}
