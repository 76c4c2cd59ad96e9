//! Integer-dominant codec.
//!
//! Values that are exact integers go into a zig-zag varint stream. The
//! minority that are not (fractions, non-finite values, `-0.0`, magnitudes
//! beyond `i64`) are listed up front as `(index gap, raw value)` exceptions and
//! hold a zero slot in the integer stream.
//!
//! Layout: `exceptions: varint`, then per exception `gap: varint` +
//! `value: 64 bits`, then `count` integer varints.

use strata_core::varint::{zigzag_decode, zigzag_encode};
use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

/// 2^63, the first magnitude that no longer fits an `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// The value as an `i64` if that conversion is lossless, bits included.
pub fn as_exact_integer(v: f64) -> Option<i64> {
    if !(v >= -I64_LIMIT && v < I64_LIMIT) || v.trunc() != v {
        return None;
    }
    let n = v as i64;
    ((n as f64).to_bits() == v.to_bits()).then_some(n)
}

pub fn encode(values: &[f64]) -> Vec<u8> {
    let integers: Vec<Option<i64>> = values.iter().map(|&v| as_exact_integer(v)).collect();
    let exceptions = integers.iter().filter(|n| n.is_none()).count();

    let mut w = BitWriter::with_capacity(values.len() * 2 + exceptions * 9);
    w.write_uvarint(exceptions as u64);
    let mut next = 0usize;
    for (i, n) in integers.iter().enumerate() {
        if n.is_none() {
            w.write_uvarint((i - next) as u64);
            w.write_f64(values[i]);
            next = i + 1;
        }
    }
    for n in &integers {
        w.write_uvarint(zigzag_encode(n.unwrap_or(0)));
    }
    w.finish()
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let exceptions = r.read_uvarint()?;
    if exceptions > count as u64 {
        return Err(CodecError::malformed(format!(
            "{exceptions} exceptions for {count} values"
        )));
    }

    let mut listed = Vec::with_capacity((exceptions as usize).min(1 << 16));
    let mut next = 0u64;
    for _ in 0..exceptions {
        let index = next
            .checked_add(r.read_uvarint()?)
            .filter(|&i| i < count as u64)
            .ok_or_else(|| CodecError::malformed("exception index out of range"))?;
        listed.push((index as usize, r.read_f64()?));
        next = index + 1;
    }

    let mut out = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        out.push(zigzag_decode(r.read_uvarint()?) as f64);
    }
    for (index, value) in listed {
        out[index] = value;
    }
    r.expect_end()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_exact_integer() {
        assert_eq!(as_exact_integer(42.0), Some(42));
        assert_eq!(as_exact_integer(-7.0), Some(-7));
        assert_eq!(as_exact_integer(0.0), Some(0));
        assert_eq!(as_exact_integer(-0.0), None);
        assert_eq!(as_exact_integer(1.5), None);
        assert_eq!(as_exact_integer(f64::NAN), None);
        assert_eq!(as_exact_integer(f64::INFINITY), None);
        assert_eq!(as_exact_integer(-I64_LIMIT), Some(i64::MIN));
        assert_eq!(as_exact_integer(I64_LIMIT), None);
    }

    #[test]
    fn test_all_integers() {
        let values: Vec<f64> = (0..200).map(|i| (i * 3 - 100) as f64).collect();
        let payload = encode(&values);
        assert!(payload.len() < 2 * values.len() + 1);
        assert_eq!(decode(&payload, values.len()).unwrap(), values);
    }

    #[test]
    fn test_with_exceptions() {
        let values = [1.0, 2.5, 3.0, -0.0, f64::NAN, 6.0, 1e300];
        let decoded = decode(&encode(&values), values.len()).unwrap();
        for (a, b) in values.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_bad_exception_index() {
        let mut w = BitWriter::new();
        w.write_uvarint(1);
        w.write_uvarint(5);
        w.write_f64(0.5);
        w.write_uvarint(0);
        assert!(decode(&w.finish(), 1).is_err());
    }

    #[test]
    fn test_huge_exception_count_without_data() {
        let mut w = BitWriter::new();
        w.write_uvarint(1 << 28);
        assert!(decode(&w.finish(), 1 << 28).is_err());
    }
}
