//! Fixed-width fallback: every value as its raw 64-bit pattern.

use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

pub fn encode(values: &[f64]) -> Vec<u8> {
    let mut w = BitWriter::with_capacity(values.len() * 8);
    for &v in values {
        w.write_f64(v);
    }
    w.finish()
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    if payload.len() != count.saturating_mul(8) {
        return Err(CodecError::malformed(format!(
            "fixed-width payload of {} bytes for {count} values",
            payload.len()
        )));
    }
    let mut r = BitReader::new(payload);
    (0..count).map(|_| r.read_f64()).collect()
}
