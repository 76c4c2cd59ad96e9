//! Delta codec with zero-skip.
//!
//! The first value is stored raw; every later value is a residual word
//! against its predecessor. Unchanged values cost one bit.

use strata_core::Result;

use crate::bitstream::{BitReader, BitWriter};
use crate::residual::{apply_residual, read_residual, residual_word, write_residual};

pub fn encode(values: &[f64]) -> Vec<u8> {
    let mut w = BitWriter::with_capacity(8 + values.len() * 2);
    w.write_f64(values[0]);
    for pair in values.windows(2) {
        write_residual(&mut w, residual_word(pair[1], pair[0]));
    }
    w.finish()
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let mut out = Vec::with_capacity(count.min(1 << 16));
    let mut prev = r.read_f64()?;
    out.push(prev);
    for _ in 1..count {
        prev = apply_residual(prev, read_residual(&mut r)?);
        out.push(prev);
    }
    r.expect_end()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_scenario() {
        let values = [45.2, 47.1, 43.8, 46.5];
        let decoded = decode(&encode(&values), 4).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_counter_like_series() {
        let values: Vec<f64> = (0..1000).map(|i| 1.0e6 + i as f64).collect();
        let payload = encode(&values);
        assert!(payload.len() < values.len() * 8 / 2);
        assert_eq!(decode(&payload, values.len()).unwrap(), values);
    }

    #[test]
    fn test_unchanged_values() {
        let values = vec![3.25; 81];
        let payload = encode(&values);
        assert_eq!(payload.len(), 8 + 10);
        assert_eq!(decode(&payload, values.len()).unwrap(), values);
    }

    #[test]
    fn test_signed_zero_and_nan_bits() {
        let values = [0.0, -0.0, f64::NAN, -f64::NAN, f64::INFINITY, 1.0];
        let decoded = decode(&encode(&values), values.len()).unwrap();
        for (a, b) in values.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut payload = encode(&[1.0, 1.0]);
        payload.push(0xFF);
        assert!(decode(&payload, 2).is_err());
    }
}
