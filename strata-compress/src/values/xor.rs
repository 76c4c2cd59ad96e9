//! Gorilla-style XOR codec.
//!
//! The first value is stored raw. Each following value is XORed with its
//! predecessor's bit pattern:
//!
//! - XOR == 0: a single `0` bit.
//! - otherwise: `1`, 6-bit leading zero count, 6-bit (significant bits - 1),
//!   then the significant bits with leading and trailing zeros stripped.
//!
//! Works on raw bit patterns, so NaN payloads and signed zeros survive.

use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

pub fn encode(values: &[f64]) -> Vec<u8> {
    let mut w = BitWriter::with_capacity(8 + values.len() * 2);
    let mut prev = values[0].to_bits();
    w.write_bits(prev, 64);
    for v in &values[1..] {
        let bits = v.to_bits();
        let xor = bits ^ prev;
        if xor == 0 {
            w.write_bit(false);
        } else {
            let leading = xor.leading_zeros();
            let trailing = xor.trailing_zeros();
            let significant = 64 - leading - trailing;
            w.write_bit(true);
            w.write_bits(leading as u64, 6);
            w.write_bits((significant - 1) as u64, 6);
            w.write_bits(xor >> trailing, significant);
        }
        prev = bits;
    }
    w.finish()
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let mut out = Vec::with_capacity(count.min(1 << 16));
    let mut prev = r.read_bits(64)?;
    out.push(f64::from_bits(prev));
    for _ in 1..count {
        if r.read_bit()? {
            let leading = r.read_bits(6)? as u32;
            let significant = r.read_bits(6)? as u32 + 1;
            if leading + significant > 64 {
                return Err(CodecError::malformed(format!(
                    "xor window {leading} + {significant} exceeds 64 bits"
                )));
            }
            let trailing = 64 - leading - significant;
            prev ^= r.read_bits(significant)? << trailing;
        }
        out.push(f64::from_bits(prev));
    }
    r.expect_end()?;
    Ok(out)
}
