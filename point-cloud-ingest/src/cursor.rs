/// Little-endian fixed-offset reads over a byte buffer.
use crate::error::{IngestError, Result};

fn field<const N: usize>(buf: &[u8], offset: usize, name: &'static str) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| buf.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or(IngestError::Truncated {
            field: name,
            offset,
            needed: N,
            len: buf.len(),
        })
}

#[inline]
pub fn read_u8(buf: &[u8], offset: usize, name: &'static str) -> Result<u8> {
    field::<1>(buf, offset, name).map(|b| b[0])
}

#[inline]
pub fn read_u16(buf: &[u8], offset: usize, name: &'static str) -> Result<u16> {
    field(buf, offset, name).map(u16::from_le_bytes)
}

#[inline]
pub fn read_u32(buf: &[u8], offset: usize, name: &'static str) -> Result<u32> {
    field(buf, offset, name).map(u32::from_le_bytes)
}

#[inline]
pub fn read_i32(buf: &[u8], offset: usize, name: &'static str) -> Result<i32> {
    field(buf, offset, name).map(i32::from_le_bytes)
}

#[inline]
pub fn read_f64(buf: &[u8], offset: usize, name: &'static str) -> Result<f64> {
    field(buf, offset, name).map(f64::from_le_bytes)
}
