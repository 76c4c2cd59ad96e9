//! MSB-first bit writer and reader.
//!
//! Every payload in this crate is produced through [`BitWriter`] and consumed
//! through [`BitReader`]. Values are written most-significant bit first, so a
//! 64-bit field lands in the buffer in big-endian byte order regardless of the
//! host platform.

use strata_core::varint::MAX_VARINT_LEN;
use strata_core::{CodecError, Result};

/// Append-only bit buffer.
///
/// There is no explicit flush: [`BitWriter::finish`] consumes the writer,
/// zero-pads the last partial byte and hands back the bytes.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Number of bits written.
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with `capacity` bytes pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            bit_len: 0,
        }
    }

    #[inline]
    pub fn len_bits(&self) -> usize {
        self.bit_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Appends the low `width` bits of `value`, most significant first.
    ///
    /// Bits of `value` above `width` are ignored. A width of zero writes
    /// nothing.
    pub fn write_bits(&mut self, value: u64, width: u32) {
        debug_assert!(width <= 64);
        let mut left = width;
        while left > 0 {
            let offset = (self.bit_len % 8) as u32;
            if offset == 0 {
                self.bytes.push(0);
            }
            let free = 8 - offset;
            let take = free.min(left);
            let chunk = ((value >> (left - take)) & ((1u64 << take) - 1)) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= chunk << (free - take);
            self.bit_len += take as usize;
            left -= take;
        }
    }

    /// Raw IEEE-754 bit pattern, 64 bits.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.write_bits(value.to_bits(), 64);
    }

    /// LEB128 varint in 8-bit groups.
    pub fn write_uvarint(&mut self, mut n: u64) {
        while n >= 0x80 {
            self.write_bits((n & 0x7F) | 0x80, 8);
            n >>= 7;
        }
        self.write_bits(n, 8);
    }

    /// Pads the final byte with zeros and returns the buffer.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Sequential reader over a finished bit buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    /// Current bit position (0-indexed from the start).
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        (self.bytes.len() * 8).saturating_sub(self.pos)
    }

    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads `width` bits as an unsigned integer.
    ///
    /// Fails with [`CodecError::BitStreamExhausted`] without consuming
    /// anything if fewer than `width` bits remain.
    pub fn read_bits(&mut self, width: u32) -> Result<u64> {
        debug_assert!(width <= 64);
        let remaining = self.remaining();
        if remaining < width as usize {
            return Err(CodecError::BitStreamExhausted {
                position: self.pos,
                requested: width,
                remaining,
            });
        }
        let mut value = 0u64;
        let mut left = width;
        while left > 0 {
            let byte = self.bytes[self.pos / 8];
            let avail = 8 - (self.pos % 8) as u32;
            let take = avail.min(left);
            let chunk = (byte >> (avail - take)) as u64 & ((1u64 << take) - 1);
            value = (value << take) | chunk;
            self.pos += take as usize;
            left -= take;
        }
        Ok(value)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_bits(64)?))
    }

    pub fn read_uvarint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_bits(8)?;
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(CodecError::InvalidVarint);
            }
            result |= (byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(CodecError::InvalidVarint)
    }

    /// Checks that only zero padding of the final byte is left.
    pub fn expect_end(&mut self) -> Result<()> {
        let remaining = self.remaining();
        if remaining >= 8 {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after payload",
                remaining / 8
            )));
        }
        if remaining > 0 && self.read_bits(remaining as u32)? != 0 {
            return Err(CodecError::malformed("non-zero padding bits"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_write_and_read_bits() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        w.write_bit(false);
        w.write_bit(true);
        w.write_bit(true);
        assert_eq!(w.len_bits(), 4);
        let bytes = w.finish();
        assert_eq!(bytes, vec![0b1011_0000]);

        let mut r = BitReader::new(&bytes);
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        r.expect_end().unwrap();
    }

    #[test]
    fn test_boundary_widths() {
        let fields: [(u64, u32); 12] = [
            (1, 1),
            (0x55, 7),
            (0xA5, 8),
            (0x1FF, 9),
            (0x7FFF_FFFF_FFFF_FFFE, 63),
            (0xDEAD_BEEF_CAFE_BABE, 64),
            (0, 1),
            (0x01, 7),
            (0x80, 8),
            (0x100, 9),
            (1, 63),
            (u64::MAX, 64),
        ];
        let mut w = BitWriter::new();
        for (value, width) in fields {
            w.write_bits(value, width);
        }
        let total: u32 = fields.iter().map(|(_, w)| w).sum();
        assert_eq!(w.len_bits(), total as usize);
        let bytes = w.finish();
        assert_eq!(bytes.len(), (total as usize).div_ceil(8));

        let mut r = BitReader::new(&bytes);
        for (value, width) in fields {
            assert_eq!(r.read_bits(width).unwrap(), value, "width {width}");
        }
        r.expect_end().unwrap();
    }

    #[test]
    fn test_write_truncates_to_width() {
        let mut w = BitWriter::new();
        w.write_bits(0xFF, 4);
        let bytes = w.finish();
        assert_eq!(bytes, vec![0xF0]);
    }

    #[test]
    fn test_exhausted() {
        let bytes = [0xAB];
        let mut r = BitReader::new(&bytes);
        r.read_bits(5).unwrap();
        let err = r.read_bits(4).unwrap_err();
        assert_eq!(
            err,
            CodecError::BitStreamExhausted {
                position: 5,
                requested: 4,
                remaining: 3,
            }
        );
        // A failed read consumes nothing.
        assert_eq!(r.read_bits(3).unwrap(), 0b011);
    }

    #[test]
    fn test_empty_reader() {
        let mut r = BitReader::new(&[]);
        assert_eq!(r.remaining(), 0);
        assert!(r.read_bit().is_err());
        r.expect_end().unwrap();
    }

    #[test]
    fn test_uvarint_unaligned() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        w.write_uvarint(300);
        w.write_uvarint(u64::MAX);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert!(r.read_bit().unwrap());
        assert_eq!(r.read_uvarint().unwrap(), 300);
        assert_eq!(r.read_uvarint().unwrap(), u64::MAX);
        r.expect_end().unwrap();
    }

    #[test]
    fn test_expect_end_rejects_trailing() {
        let bytes = [0x00, 0x00];
        let mut r = BitReader::new(&bytes);
        r.read_bits(3).unwrap();
        assert!(r.expect_end().is_err());

        let bytes = [0b1000_0001];
        let mut r = BitReader::new(&bytes);
        r.read_bits(3).unwrap();
        assert!(r.expect_end().is_err());
    }

    proptest! {
        #[test]
        fn prop_fields_roundtrip(fields in prop::collection::vec((any::<u64>(), 1u32..=64), 0..200)) {
            let mut w = BitWriter::new();
            for &(value, width) in &fields {
                w.write_bits(value, width);
            }
            let bytes = w.finish();
            let mut r = BitReader::new(&bytes);
            for &(value, width) in &fields {
                let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
                prop_assert_eq!(r.read_bits(width).unwrap(), value & mask);
            }
            prop_assert!(r.expect_end().is_ok());
        }
    }
}
