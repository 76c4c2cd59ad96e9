//! LEB128 varints and zig-zag folding over byte buffers.

use bytes::{Buf, BufMut};

use crate::error::{CodecError, Result};

/// Longest possible LEB128 encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Folds a signed integer so small magnitudes of either sign map to small
/// unsigned values: 0, -1, 1, -2, 2, ... -> 0, 1, 2, 3, 4, ...
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

pub fn put_uvarint<B: BufMut>(buf: &mut B, mut n: u64) {
    while n >= 0x80 {
        buf.put_u8((n as u8) | 0x80);
        n >>= 7;
    }
    buf.put_u8(n as u8);
}

/// Reads one varint, advancing `buf` past it.
pub fn get_uvarint<B: Buf>(buf: &mut B) -> Result<u64> {
    let mut result = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(CodecError::InvalidVarint);
        }
        let byte = buf.get_u8();
        // The tenth byte may only contribute the single top bit.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(CodecError::InvalidVarint);
        }
        result |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(CodecError::InvalidVarint)
}

/// Number of bytes `put_uvarint` would emit for `n`.
pub fn uvarint_len(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
