//! Periodic codec.
//!
//! Stores the first period verbatim as a template and every later element as
//! a residual word against the template slot at the same phase.
//!
//! Layout: `period: varint`, `period` raw values, then `count - period`
//! residual words.

use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};
use crate::residual::{apply_residual, read_residual, residual_word, write_residual};

pub fn encode(values: &[f64], period: usize) -> Result<Vec<u8>> {
    if period < 2 {
        return Err(CodecError::Unsupported("period must be at least 2"));
    }
    if values.len() <= period {
        return Err(CodecError::Unsupported("series shorter than two periods"));
    }

    let (template, rest) = values.split_at(period);
    let mut w = BitWriter::with_capacity(period * 8 + rest.len() * 2);
    w.write_uvarint(period as u64);
    for &v in template {
        w.write_f64(v);
    }
    for (i, &v) in rest.iter().enumerate() {
        write_residual(&mut w, residual_word(v, template[i % period]));
    }
    Ok(w.finish())
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let period = r.read_uvarint()?;
    if period < 2 || period >= count as u64 {
        return Err(CodecError::malformed(format!(
            "period {period} invalid for {count} values"
        )));
    }
    let period = period as usize;

    let mut out = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..period {
        out.push(r.read_f64()?);
    }
    for i in period..count {
        let reference = out[i % period];
        out.push(apply_residual(reference, read_residual(&mut r)?));
    }
    r.expect_end()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_repetition() {
        let day = [1.0, 4.0, 9.0, 16.0];
        let values: Vec<f64> = day.iter().cycle().take(400).copied().collect();
        let payload = encode(&values, 4).unwrap();
        // varint + template + one bit per remaining value.
        assert_eq!(payload.len(), 1 + 32 + 396usize.div_ceil(8));
        assert_eq!(decode(&payload, values.len()).unwrap(), values);
    }

    #[test]
    fn test_drifting_repetition() {
        let values: Vec<f64> = (0..240)
            .map(|i| ((i % 24) as f64).sin() * 10.0 + (i / 24) as f64 * 1e-9)
            .collect();
        let decoded = decode(&encode(&values, 24).unwrap(), values.len()).unwrap();
        for (a, b) in values.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_partial_last_period() {
        let values = [1.0, 2.0, 3.0, 1.0, 2.0];
        let decoded = decode(&encode(&values, 3).unwrap(), 5).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_short_series_unsupported() {
        assert!(encode(&[1.0, 2.0], 2).is_err());
        assert!(encode(&[1.0, 2.0, 3.0], 1).is_err());
    }

    #[test]
    fn test_bad_period_rejected() {
        let payload = encode(&[1.0, 2.0, 1.0, 2.0], 2).unwrap();
        assert!(decode(&payload, 2).is_err());
    }
}
