//! Numeric thresholds shared by the classifier and the selector.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Classifier and verification thresholds.
///
/// Every tolerance and cutoff used to shortlist or accept a candidate lives
/// here; nothing downstream hardcodes its own epsilon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Absolute floor of the per-element verification tolerance.
    pub abs_tolerance: f64,
    /// Relative part of the per-element verification tolerance.
    pub rel_tolerance: f64,
    /// Share of integral values above which integer-dominant is tried.
    pub integer_fraction: f64,
    /// Ceiling on the coefficient of variation of consecutive ratios for the
    /// exponential codec.
    pub exponential_cv: f64,
    /// Normalized autocorrelation a lag must exceed to try periodic encoding.
    pub autocorrelation: f64,
    /// Largest dictionary the quantized codec may build.
    pub max_dictionary: usize,
    /// Lags probed for periodicity.
    pub period_probes: Vec<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            abs_tolerance: 1e-9,
            rel_tolerance: 1e-9,
            integer_fraction: 0.95,
            exponential_cv: 0.05,
            autocorrelation: 0.9,
            max_dictionary: 256,
            period_probes: vec![2, 3, 4, 5, 8, 12, 24, 48, 96],
        }
    }
}

impl CodecConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CodecError::malformed(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tolerance_ok = |t: f64| t.is_finite() && t >= 0.0;
        if !tolerance_ok(self.abs_tolerance) || !tolerance_ok(self.rel_tolerance) {
            return Err(CodecError::malformed(
                "config: tolerances must be finite and non-negative",
            ));
        }
        if !(self.integer_fraction > 0.0 && self.integer_fraction <= 1.0) {
            return Err(CodecError::malformed(
                "config: integer_fraction must lie in (0, 1]",
            ));
        }
        if !tolerance_ok(self.exponential_cv) || !self.autocorrelation.is_finite() {
            return Err(CodecError::malformed(
                "config: exponential_cv and autocorrelation must be finite",
            ));
        }
        if !(1..=256).contains(&self.max_dictionary) {
            return Err(CodecError::malformed(
                "config: max_dictionary must lie in 1..=256",
            ));
        }
        if self.period_probes.iter().any(|&p| p < 2) {
            return Err(CodecError::malformed("config: period probes must be >= 2"));
        }
        Ok(())
    }

    /// Allowed absolute error when reconstructing `expected`.
    #[inline]
    pub fn tolerance_for(&self, expected: f64) -> f64 {
        self.abs_tolerance.max(self.rel_tolerance * expected.abs())
    }

    /// NaN never satisfies this, which keeps non-finite series on exact paths.
    #[inline]
    pub fn within_tolerance(&self, expected: f64, actual: f64) -> bool {
        (actual - expected).abs() <= self.tolerance_for(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        CodecConfig::default().validate().unwrap();
    }

    #[test]
    fn test_from_json_partial() {
        let config = CodecConfig::from_json(r#"{ "max_dictionary": 16 }"#).unwrap();
        assert_eq!(config.max_dictionary, 16);
        assert_eq!(config.abs_tolerance, 1e-9);
        assert_eq!(config.period_probes.len(), 9);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(CodecConfig::from_json(r#"{ "max_dictionary": 1000 }"#).is_err());
        assert!(CodecConfig::from_json(r#"{ "period_probes": [1, 4] }"#).is_err());
        assert!(CodecConfig::from_json(r#"{ "abs_tolerance": -1.0 }"#).is_err());
        assert!(CodecConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_tolerance() {
        let config = CodecConfig::default();
        assert_eq!(config.tolerance_for(0.0), 1e-9);
        assert!((config.tolerance_for(1e6) - 1e-3).abs() < 1e-12);
        assert!(config.within_tolerance(1e6, 1e6 + 5e-4));
        assert!(!config.within_tolerance(1.0, 1.0 + 1e-8));
        assert!(!config.within_tolerance(f64::NAN, f64::NAN));
        assert!(!config.within_tolerance(f64::INFINITY, f64::INFINITY));
    }
}
