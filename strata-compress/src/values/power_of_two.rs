//! Power-of-two codec.
//!
//! Every value must be `±2^k` (normal or subnormal) or a signed zero. The
//! payload is a 1-bit "has negatives" flag, an optional per-element sign
//! bitmap, and one zig-zag varint exponent per element. Zero is written as the
//! reserved exponent [`ZERO_EXPONENT`], one past the largest finite exponent.

use strata_core::varint::{zigzag_decode, zigzag_encode};
use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

pub const ZERO_EXPONENT: i64 = 1024;

const SIGN_MASK: u64 = 1 << 63;
const MANTISSA_MASK: u64 = (1 << 52) - 1;

/// `Some(k)` when `|v| == 2^k`, `Some(ZERO_EXPONENT)` for ±0, `None` otherwise.
pub fn exponent_of(v: f64) -> Option<i64> {
    let magnitude = v.to_bits() & !SIGN_MASK;
    if magnitude == 0 {
        return Some(ZERO_EXPONENT);
    }
    let biased = (magnitude >> 52) as i64;
    let mantissa = magnitude & MANTISSA_MASK;
    match biased {
        0 => mantissa
            .is_power_of_two()
            .then(|| mantissa.trailing_zeros() as i64 - 1074),
        0x7FF => None,
        _ => (mantissa == 0).then(|| biased - 1023),
    }
}

fn power_of_two(k: i64) -> Option<f64> {
    match k {
        -1022..=1023 => Some(f64::from_bits(((k + 1023) as u64) << 52)),
        -1074..=-1023 => Some(f64::from_bits(1u64 << (k + 1074))),
        _ => None,
    }
}

pub fn encode(values: &[f64]) -> Result<Vec<u8>> {
    let exponents = values
        .iter()
        .map(|&v| exponent_of(v))
        .collect::<Option<Vec<_>>>()
        .ok_or(CodecError::Unsupported("value is not a power of two"))?;

    let mut w = BitWriter::with_capacity(1 + values.len() * 9 / 8);
    let has_negatives = values.iter().any(|v| v.is_sign_negative());
    w.write_bit(has_negatives);
    if has_negatives {
        for v in values {
            w.write_bit(v.is_sign_negative());
        }
    }
    for k in exponents {
        w.write_uvarint(zigzag_encode(k));
    }
    Ok(w.finish())
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let signs = if r.read_bit()? {
        (0..count).map(|_| r.read_bit()).collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let mut out = Vec::with_capacity(count.min(1 << 16));
    for i in 0..count {
        let k = zigzag_decode(r.read_uvarint()?);
        let magnitude = if k == ZERO_EXPONENT {
            0.0
        } else {
            power_of_two(k)
                .ok_or_else(|| CodecError::malformed(format!("exponent {k} out of range")))?
        };
        let negative = signs.get(i).copied().unwrap_or(false);
        out.push(if negative { -magnitude } else { magnitude });
    }
    r.expect_end()?;
    Ok(out)
}
