//! Zero-skip residual words.
//!
//! Shared by every codec that stores a value as its distance from some
//! reference (the previous value, a mean, a template, a fitted curve). The
//! distance is taken between IEEE-754 bit patterns, so applying it back to the
//! same reference reproduces the original bits exactly.
//!
//! Wire form of one word:
//!
//! | word == 0 | `0`                                                    |
//! | otherwise | `1` + 3-bit leading zero bytes + 3-bit (significant bytes - 1) + significant bytes |

use strata_core::varint::{zigzag_decode, zigzag_encode};
use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

/// Distance from `reference` to `actual`, folded so small moves in either
/// direction give small words.
#[inline]
pub fn residual_word(actual: f64, reference: f64) -> u64 {
    let diff = (actual.to_bits() as i64).wrapping_sub(reference.to_bits() as i64);
    zigzag_encode(diff)
}

/// Inverse of [`residual_word`].
#[inline]
pub fn apply_residual(reference: f64, word: u64) -> f64 {
    let bits = (reference.to_bits() as i64).wrapping_add(zigzag_decode(word));
    f64::from_bits(bits as u64)
}

pub fn write_residual(w: &mut BitWriter, word: u64) {
    if word == 0 {
        w.write_bit(false);
        return;
    }
    let leading = word.leading_zeros() / 8;
    let trailing = word.trailing_zeros() / 8;
    let significant = 8 - leading - trailing;
    w.write_bit(true);
    w.write_bits(leading as u64, 3);
    w.write_bits((significant - 1) as u64, 3);
    w.write_bits(word >> (trailing * 8), significant * 8);
}

pub fn read_residual(r: &mut BitReader<'_>) -> Result<u64> {
    if !r.read_bit()? {
        return Ok(0);
    }
    let leading = r.read_bits(3)? as u32;
    let significant = r.read_bits(3)? as u32 + 1;
    if leading + significant > 8 {
        return Err(CodecError::malformed(format!(
            "residual header: {leading} leading + {significant} significant bytes"
        )));
    }
    let trailing = 8 - leading - significant;
    Ok(r.read_bits(significant * 8)? << (trailing * 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written_bits(word: u64) -> usize {
        let mut w = BitWriter::new();
        write_residual(&mut w, word);
        w.len_bits()
    }

    fn roundtrip_word(word: u64) -> u64 {
        let mut w = BitWriter::new();
        write_residual(&mut w, word);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let out = read_residual(&mut r).unwrap();
        r.expect_end().unwrap();
        out
    }

    #[test]
    fn test_word_roundtrip() {
        for word in [0, 1, 0xFF, 0x100, 0xFF00, 0x00FF_0000_0000_0000, u64::MAX, 1 << 63] {
            assert_eq!(roundtrip_word(word), word);
        }
    }

    #[test]
    fn test_zero_is_one_bit() {
        assert_eq!(written_bits(0), 1);
        assert_eq!(written_bits(0x0000_0000_0001_0000), 15);
        assert_eq!(written_bits(u64::MAX), 71);
    }

    #[test]
    fn test_residual_is_bit_exact() {
        let pairs = [
            (45.2, 47.1),
            (0.0, -0.0),
            (-1.5, 1.5),
            (f64::NAN, 1.0),
            (f64::INFINITY, f64::NEG_INFINITY),
            (f64::MAX, f64::MIN_POSITIVE),
        ];
        for (reference, actual) in pairs {
            let word = residual_word(actual, reference);
            assert_eq!(apply_residual(reference, word).to_bits(), actual.to_bits());
        }
    }

    #[test]
    fn test_nearby_values_give_short_words() {
        let a = 100.0_f64;
        let b = f64::from_bits(a.to_bits() + 3);
        assert_eq!(residual_word(b, a), 6);
        assert_eq!(written_bits(residual_word(b, a)), 15);
    }

    #[test]
    fn test_bad_header() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        w.write_bits(7, 3);
        w.write_bits(7, 3);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert!(matches!(read_residual(&mut r), Err(CodecError::Malformed(_))));
    }
}
