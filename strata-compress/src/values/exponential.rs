//! Exponential codec.
//!
//! Fits a constant ratio `R` between consecutive values and stores `values[0]`,
//! `R`, and one residual word per later element against the curve
//! `values[0] * R^i`. The curve is rebuilt by repeated multiplication on both
//! sides, so the reconstruction is deterministic.

use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};
use crate::residual::{apply_residual, read_residual, residual_word, write_residual};

/// Mean and spread of the consecutive ratios of a series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatioFit {
    pub ratio: f64,
    /// Coefficient of variation of the ratios.
    pub cv: f64,
    /// Number of ratios that went into the fit.
    pub samples: usize,
}

/// Fits `values[i + 1] / values[i]`, skipping zero divisors and non-finite
/// quotients. `None` if nothing usable is left.
pub fn fit_ratio(values: &[f64]) -> Option<RatioFit> {
    let ratios: Vec<f64> = values
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| pair[1] / pair[0])
        .filter(|r| r.is_finite())
        .collect();
    if ratios.is_empty() {
        return None;
    }
    let n = ratios.len() as f64;
    let mean = ratios.iter().sum::<f64>() / n;
    if mean == 0.0 || !mean.is_finite() {
        return None;
    }
    let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    Some(RatioFit {
        ratio: mean,
        cv: variance.sqrt() / mean.abs(),
        samples: ratios.len(),
    })
}

pub fn encode(values: &[f64]) -> Result<Vec<u8>> {
    let ratio = match fit_ratio(values) {
        Some(fit) => fit.ratio,
        None if values.len() == 1 => 1.0,
        None => return Err(CodecError::Unsupported("no usable ratio between values")),
    };

    let mut w = BitWriter::with_capacity(16 + values.len() * 2);
    w.write_f64(values[0]);
    w.write_f64(ratio);
    let mut curve = values[0];
    for &v in &values[1..] {
        curve *= ratio;
        write_residual(&mut w, residual_word(v, curve));
    }
    Ok(w.finish())
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let first = r.read_f64()?;
    let ratio = r.read_f64()?;
    let mut out = Vec::with_capacity(count.min(1 << 16));
    out.push(first);
    let mut curve = first;
    for _ in 1..count {
        curve *= ratio;
        out.push(apply_residual(curve, read_residual(&mut r)?));
    }
    r.expect_end()?;
    Ok(out)
}
