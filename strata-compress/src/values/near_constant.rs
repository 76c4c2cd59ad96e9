//! Near-constant codec: the mean plus a residual word per element.
//!
//! Values hugging their mean share sign, exponent and most of the mantissa
//! with it, so each residual word is one or two bytes; an exactly constant
//! series costs one bit per element after the 8-byte mean.

use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};
use crate::residual::{apply_residual, read_residual, residual_word, write_residual};

pub fn encode(values: &[f64]) -> Result<Vec<u8>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CodecError::Unsupported("near-constant needs finite values"));
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if !mean.is_finite() {
        return Err(CodecError::Unsupported("near-constant mean overflows"));
    }

    let mut w = BitWriter::with_capacity(8 + values.len() / 4);
    w.write_f64(mean);
    for &v in values {
        write_residual(&mut w, residual_word(v, mean));
    }
    Ok(w.finish())
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let mean = r.read_f64()?;
    let out = (0..count)
        .map(|_| Ok(apply_residual(mean, read_residual(&mut r)?)))
        .collect::<Result<Vec<_>>>()?;
    r.expect_end()?;
    Ok(out)
}
