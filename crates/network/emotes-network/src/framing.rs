//! Primitive field codecs shared by all packet kinds.
//!
//! Integers are big-endian. Strings are an `i32` byte length followed by the
//! UTF-8 bytes; a zero length means "absent", so an empty string cannot be
//! told apart from a missing one on the wire.

use bytes::{Buf, BufMut};
use uuid::Uuid;

use crate::error::{NetworkError, Result};

/// Bytes taken by the length prefix of strings and byte arrays.
pub const LENGTH_PREFIX: usize = 4;
pub const UUID_SIZE: usize = 16;

#[inline]
pub fn ensure(buf: &impl Buf, need: usize) -> Result<()> {
    if buf.remaining() < need {
        Err(NetworkError::Truncated {
            need,
            have: buf.remaining(),
        })
    } else {
        Ok(())
    }
}

pub fn get_u8(buf: &mut impl Buf) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn get_bool(buf: &mut impl Buf) -> Result<bool> {
    Ok(get_u8(buf)? != 0)
}

pub fn get_i16(buf: &mut impl Buf) -> Result<i16> {
    ensure(buf, 2)?;
    Ok(buf.get_i16())
}

pub fn get_i32(buf: &mut impl Buf) -> Result<i32> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn get_f32(buf: &mut impl Buf) -> Result<f32> {
    ensure(buf, 4)?;
    Ok(buf.get_f32())
}

pub fn get_uuid(buf: &mut impl Buf) -> Result<Uuid> {
    ensure(buf, UUID_SIZE)?;
    let mut raw = [0u8; UUID_SIZE];
    buf.copy_to_slice(&mut raw);
    Ok(Uuid::from_bytes(raw))
}

#[inline]
pub fn put_uuid(buf: &mut impl BufMut, uuid: &Uuid) {
    buf.put_slice(uuid.as_bytes());
}

/// Read a length prefix and check that many bytes are actually present.
pub fn get_length(buf: &mut impl Buf) -> Result<usize> {
    let len = get_i32(buf)?;
    if len < 0 {
        return Err(NetworkError::NegativeLength(len));
    }
    let len = len as usize;
    ensure(buf, len)?;
    Ok(len)
}

/// Read a count prefix for `element_size`-byte elements without trusting it
/// for allocation.
pub fn get_count(buf: &mut impl Buf, element_size: usize) -> Result<usize> {
    let count = get_i32(buf)?;
    if count < 0 {
        return Err(NetworkError::NegativeLength(count));
    }
    let count = count as usize;
    ensure(buf, count.saturating_mul(element_size))?;
    Ok(count)
}

pub fn read_string(buf: &mut impl Buf) -> Result<Option<String>> {
    let len = get_length(buf)?;
    if len == 0 {
        return Ok(None);
    }
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    Ok(Some(String::from_utf8(raw)?))
}

pub fn write_string(buf: &mut impl BufMut, s: Option<&str>) {
    match s {
        Some(s) => {
            buf.put_i32(s.len() as i32);
            buf.put_slice(s.as_bytes());
        }
        None => buf.put_i32(0),
    }
}

#[inline]
pub fn string_size(s: Option<&str>) -> usize {
    LENGTH_PREFIX + s.map_or(0, str::len)
}

pub fn sum_strings(strings: &[Option<&str>]) -> usize {
    strings.iter().map(|s| string_size(*s)).sum()
}

pub fn read_byte_array(buf: &mut impl Buf) -> Result<Vec<u8>> {
    let len = get_length(buf)?;
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    Ok(raw)
}

pub fn write_byte_array(buf: &mut impl BufMut, bytes: &[u8]) {
    buf.put_i32(bytes.len() as i32);
    buf.put_slice(bytes);
}
