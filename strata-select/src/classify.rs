//! Pattern classifier.
//!
//! Decides which value codecs are worth attempting for a series. It never
//! rejects a series; it only prunes the candidate list so the selector does
//! not run every codec on every input.

use strata_compress::values::{exponential, power_of_two, quantized};
use strata_compress::ValueCodec;
use strata_core::CodecConfig;
use tracing::trace;

/// Shortlists codecs for `values`.
///
/// XOR and delta always lead the list and fixed-width always closes it; the
/// pattern-specific codecs in between appear only when their rule fires.
pub fn classify(values: &[f64], config: &CodecConfig) -> Vec<ValueCodec> {
    let mut shortlist = vec![ValueCodec::Xor, ValueCodec::Delta];
    if values.is_empty() {
        shortlist.push(ValueCodec::FixedWidth);
        return shortlist;
    }

    if is_near_constant(values, config) {
        trace!("near-constant");
        shortlist.push(ValueCodec::NearConstant);
    }
    if values.iter().all(|&v| power_of_two::exponent_of(v).is_some()) {
        trace!("powers of two");
        shortlist.push(ValueCodec::PowerOfTwo);
    }
    if integer_fraction(values) > config.integer_fraction {
        trace!("mostly integers");
        shortlist.push(ValueCodec::IntegerDominant);
    }
    if let Some(fit) = exponential::fit_ratio(values) {
        if fit.samples >= 2 && fit.cv < config.exponential_cv {
            trace!(ratio = fit.ratio, cv = fit.cv, "exponential");
            shortlist.push(ValueCodec::Exponential);
        }
    }
    for &period in &config.period_probes {
        if let Some(r) = autocorrelation(values, period) {
            if r > config.autocorrelation {
                trace!(period, r, "periodic");
                shortlist.push(ValueCodec::Periodic { period });
            }
        }
    }
    let limit = config.max_dictionary.min(quantized::MAX_DICTIONARY);
    if quantized::dictionary(values, limit).is_some() {
        trace!("quantized");
        shortlist.push(ValueCodec::Quantized);
    }

    shortlist.push(ValueCodec::FixedWidth);
    shortlist
}

/// `max - min` within `max(abs_tol, rel_tol * mean(|v|))`.
pub fn is_near_constant(values: &[f64], config: &CodecConfig) -> bool {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let mean_abs = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
    max - min <= config.tolerance_for(mean_abs)
}

/// Share of values equal to their own truncation.
///
/// Counts `-0.0`, infinities and integers beyond `i64` too; the codec stores
/// those as exceptions, so the shortlist may still lose on size.
pub fn integer_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let integral = values.iter().filter(|v| v.trunc() == **v).count();
    integral as f64 / values.len() as f64
}

/// Normalized autocorrelation at `lag`.
///
/// Each sum is averaged over the terms it actually has, so an exactly
/// repeating signal scores ~1 regardless of how many periods are present.
/// `None` for non-finite input, constant input, or fewer than two periods.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    let n = values.len();
    if lag == 0 || n < 2 * lag || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if variance == 0.0 || !variance.is_finite() {
        return None;
    }
    let covariance = values
        .iter()
        .zip(&values[lag..])
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum::<f64>()
        / (n - lag) as f64;
    Some(covariance / variance)
}
