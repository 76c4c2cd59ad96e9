//! Adaptive selector.
//!
//! One pass per series: classify, encode every shortlisted candidate, decode
//! each candidate back and verify it against the input, then keep the
//! smallest verified payload. A candidate that fails verification is dropped
//! no matter how small it is.

use rayon::prelude::*;
use strata_compress::values::{self, fixed};
use strata_compress::ValueCodec;
use strata_core::{CodecConfig, CodecError, CompressedBlock, Method, Result};
use thiserror::Error;
use tracing::{debug, debug_span, warn};

use crate::classify::classify;

/// Why a decoded candidate was not accepted. Never leaves the selector.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum VerificationFailed {
    #[error("{method} decoded {actual} values, expected {expected}")]
    Length {
        method: Method,
        expected: usize,
        actual: usize,
    },

    #[error("{method} value {index} decoded as {actual:e}, expected {expected:e}")]
    Value {
        method: Method,
        index: usize,
        expected: f64,
        actual: f64,
    },
}

/// What happened to one shortlisted candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Encoded and verified; `size` is the payload length in bytes.
    Accepted { size: usize },
    /// The codec declined the data.
    NotApplicable { reason: &'static str },
    /// Encoding errored, or the payload did not decode back to the input.
    Rejected { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateReport {
    pub codec: ValueCodec,
    pub outcome: CandidateOutcome,
}

/// Result of selecting a codec for one series.
#[derive(Clone, Debug)]
pub struct Selection {
    pub block: CompressedBlock,
    pub codec: ValueCodec,
    /// One entry per shortlisted candidate, in shortlist order.
    pub reports: Vec<CandidateReport>,
}

impl Selection {
    pub fn accepted(&self) -> impl Iterator<Item = &CandidateReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, CandidateOutcome::Accepted { .. }))
    }
}

/// Picks and verifies a value codec per series.
#[derive(Clone, Debug, Default)]
pub struct Selector {
    config: CodecConfig,
}

impl Selector {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `values` with the smallest verified codec.
    pub fn encode_values(&self, values: &[f64]) -> CompressedBlock {
        self.select(values).block
    }

    pub fn select(&self, values: &[f64]) -> Selection {
        self.select_with(values, |codec, values| codec.encode(values))
    }

    /// Like [`Selector::select`], with the candidate encoder supplied by the
    /// caller. Whatever `encode` returns still goes through the regular
    /// decoder and verification before it can win.
    pub fn select_with<F>(&self, values: &[f64], encode: F) -> Selection
    where
        F: Fn(&ValueCodec, &[f64]) -> Result<Vec<u8>> + Sync,
    {
        let _span = debug_span!("select", count = values.len()).entered();
        if values.is_empty() {
            return Selection {
                block: CompressedBlock::empty(Method::FixedWidth),
                codec: ValueCodec::FixedWidth,
                reports: Vec::new(),
            };
        }

        let shortlist = classify(values, &self.config);
        let results: Vec<(ValueCodec, std::result::Result<Vec<u8>, CandidateOutcome>)> =
            shortlist
                .par_iter()
                .map(|codec| (*codec, self.evaluate(codec, values, &encode)))
                .collect();

        let mut reports = Vec::with_capacity(results.len());
        let mut best: Option<(ValueCodec, Vec<u8>)> = None;
        for (codec, result) in results {
            let outcome = match result {
                Ok(payload) => {
                    let size = payload.len();
                    let better = best.as_ref().map_or(true, |(current, held)| {
                        (size, codec.method().priority())
                            < (held.len(), current.method().priority())
                    });
                    if better {
                        best = Some((codec, payload));
                    }
                    CandidateOutcome::Accepted { size }
                }
                Err(outcome) => outcome,
            };
            debug!(%codec, ?outcome, "candidate");
            reports.push(CandidateReport { codec, outcome });
        }

        let (codec, payload) = best.unwrap_or_else(|| {
            warn!("no candidate verified, forcing fixed-width");
            (ValueCodec::FixedWidth, fixed::encode(values))
        });
        debug!(%codec, size = payload.len(), "selected");
        Selection {
            block: CompressedBlock::new(codec.method(), values.len() as u64, payload),
            codec,
            reports,
        }
    }

    fn evaluate<F>(
        &self,
        codec: &ValueCodec,
        values: &[f64],
        encode: &F,
    ) -> std::result::Result<Vec<u8>, CandidateOutcome>
    where
        F: Fn(&ValueCodec, &[f64]) -> Result<Vec<u8>>,
    {
        let payload = encode(codec, values).map_err(|e| match e {
            CodecError::Unsupported(reason) => CandidateOutcome::NotApplicable { reason },
            other => CandidateOutcome::Rejected {
                reason: format!("encode: {other}"),
            },
        })?;
        let decoded = values::decode(codec.method(), &payload, values.len()).map_err(|e| {
            CandidateOutcome::Rejected {
                reason: format!("decode: {e}"),
            }
        })?;
        self.verify(codec.method(), values, &decoded)
            .map_err(|e| CandidateOutcome::Rejected {
                reason: e.to_string(),
            })?;
        Ok(payload)
    }

    /// Bit-exact comparison for exact methods, configured tolerance for the
    /// deviation-based ones.
    fn verify(
        &self,
        method: Method,
        expected: &[f64],
        actual: &[f64],
    ) -> std::result::Result<(), VerificationFailed> {
        if expected.len() != actual.len() {
            return Err(VerificationFailed::Length {
                method,
                expected: expected.len(),
                actual: actual.len(),
            });
        }
        let exact = method.is_bit_exact();
        let mismatch = expected.iter().zip(actual).position(|(&e, &a)| {
            if exact {
                e.to_bits() != a.to_bits()
            } else {
                !self.config.within_tolerance(e, a)
            }
        });
        match mismatch {
            Some(index) => Err(VerificationFailed::Value {
                method,
                index,
                expected: expected[index],
                actual: actual[index],
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_creation() {
        let selector = Selector::new(CodecConfig::default());
        assert_eq!(selector.config().max_dictionary, 256);
    }

    #[test]
    fn test_scenario_selects_xor_or_delta() {
        let values = [45.2, 47.1, 43.8, 46.5];
        let selection = Selector::default().select(&values);
        let method = selection.block.method;
        assert!(method == Method::Xor || method == Method::Delta, "{method}");
        assert_eq!(selection.block.count, 4);

        let size_of = |codec: ValueCodec| {
            selection.reports.iter().find(|r| r.codec == codec).map(|r| match r.outcome {
                CandidateOutcome::Accepted { size } => size,
                _ => usize::MAX,
            })
        };
        let xor = size_of(ValueCodec::Xor).unwrap();
        let delta = size_of(ValueCodec::Delta).unwrap();
        if method == Method::Xor {
            assert!(xor <= delta);
        } else {
            assert!(delta < xor);
        }
    }

    #[test]
    fn test_verify_exact_rejects_signed_zero_swap() {
        let selector = Selector::default();
        assert!(selector.verify(Method::Xor, &[0.0], &[-0.0]).is_err());
        assert!(selector.verify(Method::NearConstant, &[0.0], &[-0.0]).is_ok());
    }

    #[test]
    fn test_verify_tolerance() {
        let selector = Selector::default();
        let err = selector
            .verify(Method::Periodic, &[1.0, 2.0], &[1.0, 2.1])
            .unwrap_err();
        assert!(matches!(err, VerificationFailed::Value { index: 1, .. }));
        assert!(selector
            .verify(Method::Exponential, &[1e9], &[1e9 + 0.5])
            .is_ok());
        assert!(selector
            .verify(Method::Periodic, &[f64::NAN], &[f64::NAN])
            .is_err());
        assert!(matches!(
            selector.verify(Method::Xor, &[1.0], &[]),
            Err(VerificationFailed::Length { .. })
        ));
    }

    #[test]
    fn test_ties_break_by_priority() {
        // Constant series: xor and delta both cost 8 bytes + 1 bit per value.
        let values = vec![1.0; 9];
        let selection = Selector::default().select(&values);
        assert_eq!(selection.codec, ValueCodec::Xor);
    }

    #[test]
    fn test_not_applicable_is_reported() {
        let values: Vec<f64> = (0..50).map(|i| 0.5 * i as f64 + 0.1).collect();
        let selection = Selector::default().select(&values);
        assert!(selection
            .reports
            .iter()
            .all(|r| !matches!(r.outcome, CandidateOutcome::Rejected { .. })));
        assert!(selection.accepted().count() >= 3);
    }

    #[test]
    fn test_forced_fallback_when_everything_fails() {
        let values = [1.0, 2.0, 3.0];
        let selection = Selector::default()
            .select_with(&values, |_, _| Err(CodecError::malformed("broken")));
        assert_eq!(selection.codec, ValueCodec::FixedWidth);
        assert_eq!(selection.block.payload.len(), 24);
        assert!(selection.accepted().next().is_none());
    }
}
