//! Synthetic LAS and LAZ buffers for tests.
//!
//! Shared with integration tests and downstream crates that need real
//! container bytes. Builders panic on invalid input.

use constants::las_layout::{self as layout, LASZIP_RECORD_ID, LASZIP_USER_ID};
use std::io::Cursor;

/// One point record to be written by [`LasBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixturePoint {
    pub raw: [i32; 3],
    pub rgb: Option<[u16; 3]>,
}

impl FixturePoint {
    pub fn new(raw: [i32; 3]) -> Self {
        Self { raw, rgb: None }
    }

    pub fn with_rgb(mut self, rgb: [u16; 3]) -> Self {
        self.rgb = Some(rgb);
        self
    }
}

/// Record length mandated by the LAS specification for each point format.
pub fn standard_record_length(point_format: u8) -> u16 {
    match point_format {
        0 => 20,
        1 => 28,
        2 => 26,
        3 => 34,
        4 => 57,
        5 => 63,
        6 => 30,
        7 => 36,
        8 => 38,
        9 => 59,
        10 => 67,
        other => panic!("no standard record length for point format {other}"),
    }
}

/// Builder for byte-exact LAS containers.
#[derive(Debug, Clone)]
pub struct LasBuilder {
    major: u8,
    minor: u8,
    point_format: u8,
    record_length: Option<u16>,
    scale: [f64; 3],
    offset: [f64; 3],
    legacy_count: Option<u32>,
    extended_count: Option<u64>,
    points: Vec<FixturePoint>,
    vlrs: Vec<(String, u16, Vec<u8>)>,
}

impl LasBuilder {
    pub fn new(major: u8, minor: u8, point_format: u8) -> Self {
        Self {
            major,
            minor,
            point_format,
            record_length: None,
            scale: [0.01, 0.01, 0.01],
            offset: [0.0, 0.0, 0.0],
            legacy_count: None,
            extended_count: None,
            points: Vec::new(),
            vlrs: Vec::new(),
        }
    }

    pub fn record_length(mut self, length: u16) -> Self {
        self.record_length = Some(length);
        self
    }

    pub fn scale(mut self, scale: [f64; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    /// Override the legacy 32-bit count, which otherwise matches the point list.
    pub fn legacy_count(mut self, count: u32) -> Self {
        self.legacy_count = Some(count);
        self
    }

    /// Override the 64-bit count written by 1.4 headers.
    pub fn extended_count(mut self, count: u64) -> Self {
        self.extended_count = Some(count);
        self
    }

    pub fn points(mut self, points: Vec<FixturePoint>) -> Self {
        self.points = points;
        self
    }

    pub fn vlr(mut self, user_id: &str, record_id: u16, data: Vec<u8>) -> Self {
        self.vlrs.push((user_id.to_string(), record_id, data));
        self
    }

    fn header_size(&self) -> u16 {
        match (self.major, self.minor) {
            (1, minor) if minor >= 4 => 375,
            (1, 3) => 235,
            _ => 227,
        }
    }

    fn stride(&self) -> u16 {
        self.record_length
            .unwrap_or_else(|| standard_record_length(self.point_format))
    }

    /// Uncompressed LAS bytes: header, VLRs, flat point records.
    pub fn build(&self) -> Vec<u8> {
        let mut bytes = self.header_and_vlrs(self.point_format);
        bytes.extend_from_slice(&self.records());
        bytes
    }

    /// LAZ bytes for the same logical content, compressed with laszip.
    pub fn build_compressed(&self) -> Vec<u8> {
        assert!(!self.points.is_empty(), "laszip fixtures need at least one point");
        let extra_bytes = self.stride() - standard_record_length(self.point_format);
        let items = ::laz::LazItemRecordBuilder::default_for_point_format_id(
            self.point_format,
            extra_bytes,
        )
        .expect("point format supported by laszip");
        let vlr = ::laz::LazVlr::from_laz_items(items);
        let mut vlr_data = Vec::new();
        vlr.write_to(&mut vlr_data).expect("write laszip vlr");

        let mut with_vlr = self.clone();
        with_vlr.vlrs.push((LASZIP_USER_ID.to_string(), LASZIP_RECORD_ID, vlr_data));
        let header = with_vlr.header_and_vlrs(self.point_format | 0x80);
        let header_len = header.len() as u64;

        let mut cursor = Cursor::new(header);
        cursor.set_position(header_len);
        {
            let mut compressor =
                ::laz::LasZipCompressor::new(&mut cursor, vlr).expect("create compressor");
            for record in self.records().chunks_exact(usize::from(self.stride())) {
                compressor.compress_one(record).expect("compress point");
            }
            compressor.done().expect("finish laz stream");
        }
        cursor.into_inner()
    }

    fn records(&self) -> Vec<u8> {
        let stride = usize::from(self.stride());
        let mut records = vec![0u8; stride * self.points.len()];
        for (point, record) in self.points.iter().zip(records.chunks_exact_mut(stride)) {
            for (axis, value) in point.raw.iter().enumerate() {
                record[axis * 4..axis * 4 + 4].copy_from_slice(&value.to_le_bytes());
            }
            if let (Some(rgb), Some(at)) = (point.rgb, layout::colour_offset(self.point_format)) {
                if at + 6 <= stride {
                    for (channel, value) in rgb.iter().enumerate() {
                        record[at + channel * 2..at + channel * 2 + 2]
                            .copy_from_slice(&value.to_le_bytes());
                    }
                }
            }
        }
        records
    }

    fn header_and_vlrs(&self, format_byte: u8) -> Vec<u8> {
        let header_size = self.header_size();
        let vlr_bytes: usize = self
            .vlrs
            .iter()
            .map(|(_, _, data)| layout::VLR_HEADER_SIZE + data.len())
            .sum();
        let offset_to_points = usize::from(header_size) + vlr_bytes;
        let count = self.points.len();

        let mut h = vec![0u8; usize::from(header_size)];
        h[..4].copy_from_slice(layout::LAS_SIGNATURE);
        h[layout::VERSION_MAJOR] = self.major;
        h[layout::VERSION_MINOR] = self.minor;
        let software = b"point-cloud-ingest fixture";
        h[58..58 + software.len()].copy_from_slice(software);
        put(&mut h, layout::HEADER_SIZE, &header_size.to_le_bytes());
        put(&mut h, layout::OFFSET_TO_POINT_DATA, &(offset_to_points as u32).to_le_bytes());
        put(&mut h, layout::NUMBER_OF_VLRS, &(self.vlrs.len() as u32).to_le_bytes());
        h[layout::POINT_FORMAT] = format_byte;
        put(&mut h, layout::POINT_RECORD_LENGTH, &self.stride().to_le_bytes());
        let legacy = self.legacy_count.unwrap_or(count as u32);
        put(&mut h, layout::LEGACY_POINT_COUNT, &legacy.to_le_bytes());
        // first return bucket, so strict readers see a consistent total
        put(&mut h, 111, &legacy.to_le_bytes());

        let scale_at = [layout::X_SCALE, layout::Y_SCALE, layout::Z_SCALE];
        let offset_at = [layout::X_OFFSET, layout::Y_OFFSET, layout::Z_OFFSET];
        let min_at = [layout::MIN_X, layout::MIN_Y, layout::MIN_Z];
        let max_at = [layout::MAX_X, layout::MAX_Y, layout::MAX_Z];
        for axis in 0..3 {
            put(&mut h, scale_at[axis], &self.scale[axis].to_le_bytes());
            put(&mut h, offset_at[axis], &self.offset[axis].to_le_bytes());
            let values = self
                .points
                .iter()
                .map(|p| f64::from(p.raw[axis]) * self.scale[axis] + self.offset[axis]);
            let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            let (min, max) = if count == 0 { (0.0, 0.0) } else { (min, max) };
            put(&mut h, min_at[axis], &min.to_le_bytes());
            put(&mut h, max_at[axis], &max.to_le_bytes());
        }

        if header_size >= 375 {
            let extended = self.extended_count.unwrap_or(count as u64);
            put(&mut h, layout::EXTENDED_POINT_COUNT_LOW, &extended.to_le_bytes());
            put(&mut h, 255, &extended.to_le_bytes());
        }

        for (user_id, record_id, data) in &self.vlrs {
            let mut vlr = vec![0u8; layout::VLR_HEADER_SIZE];
            let id = user_id.as_bytes();
            let id_len = id.len().min(layout::VLR_USER_ID_LEN);
            vlr[layout::VLR_USER_ID..layout::VLR_USER_ID + id_len].copy_from_slice(&id[..id_len]);
            put(&mut vlr, layout::VLR_RECORD_ID, &record_id.to_le_bytes());
            put(&mut vlr, layout::VLR_RECORD_LENGTH, &(data.len() as u16).to_le_bytes());
            h.extend_from_slice(&vlr);
            h.extend_from_slice(data);
        }

        h
    }
}

fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}
