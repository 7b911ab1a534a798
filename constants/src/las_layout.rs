/// Fixed byte offsets of the LAS public header block.
/// All multi-byte fields are little-endian.

pub const LAS_SIGNATURE: &[u8; 4] = b"LASF";

pub const VERSION_MAJOR: usize = 24;
pub const VERSION_MINOR: usize = 25;
pub const HEADER_SIZE: usize = 94;
pub const OFFSET_TO_POINT_DATA: usize = 96;
pub const NUMBER_OF_VLRS: usize = 100;
pub const POINT_FORMAT: usize = 104;
pub const POINT_RECORD_LENGTH: usize = 105;
pub const LEGACY_POINT_COUNT: usize = 107;

pub const X_SCALE: usize = 131;
pub const Y_SCALE: usize = 139;
pub const Z_SCALE: usize = 147;
pub const X_OFFSET: usize = 155;
pub const Y_OFFSET: usize = 163;
pub const Z_OFFSET: usize = 171;

pub const MAX_X: usize = 179;
pub const MIN_X: usize = 187;
pub const MAX_Y: usize = 195;
pub const MIN_Y: usize = 203;
pub const MAX_Z: usize = 211;
pub const MIN_Z: usize = 219;

/// Smallest header every LAS revision carries (1.0 - 1.2).
pub const MIN_HEADER_SIZE: usize = 227;

/// Extended 64-bit point count, stored as two u32 halves.
pub const EXTENDED_POINT_COUNT_LOW: usize = 247;
pub const EXTENDED_POINT_COUNT_HIGH: usize = 251;

/// Header length required before the extended point count is trusted.
pub const EXTENDED_COUNT_MIN_HEADER_SIZE: u16 = 375;

/// Top two bits of the point format byte flag a LAZ payload.
pub const COMPRESSION_BITS: u8 = 0b1100_0000;

/// Variable length record header layout.
pub const VLR_HEADER_SIZE: usize = 54;
pub const VLR_USER_ID: usize = 2;
pub const VLR_USER_ID_LEN: usize = 16;
pub const VLR_RECORD_ID: usize = 18;
pub const VLR_RECORD_LENGTH: usize = 20;

pub const LASZIP_USER_ID: &str = "laszip encoded";
pub const LASZIP_RECORD_ID: u16 = 22204;

/// Bytes of the three i32 coordinates at the start of every point record.
pub const COORDINATE_BYTES: usize = 12;

/// Byte offset of the RGB block inside a point record, if the format has one.
pub fn colour_offset(point_format: u8) -> Option<usize> {
    match point_format {
        2 => Some(20),
        3 | 5 => Some(28),
        7 | 8 | 10 => Some(30),
        _ => None,
    }
}
