//! Value codec library.
//!
//! Each submodule is an independent `encode` / `decode` pair for one numeric
//! pattern. [`ValueCodec`] is the closed set the selector chooses from;
//! [`decode`] dispatches on the method tag alone.

pub mod delta;
pub mod exponential;
pub mod fixed;
pub mod integer;
pub mod near_constant;
pub mod periodic;
pub mod power_of_two;
pub mod quantized;
pub mod xor;

use strata_core::{CodecError, Method, Result};

/// A value encoder, with whatever parameters it needs to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueCodec {
    Xor,
    Delta,
    NearConstant,
    PowerOfTwo,
    IntegerDominant,
    Exponential,
    Periodic { period: usize },
    Quantized,
    FixedWidth,
}

impl ValueCodec {
    pub fn method(&self) -> Method {
        match self {
            ValueCodec::Xor => Method::Xor,
            ValueCodec::Delta => Method::Delta,
            ValueCodec::NearConstant => Method::NearConstant,
            ValueCodec::PowerOfTwo => Method::PowerOfTwo,
            ValueCodec::IntegerDominant => Method::IntegerDominant,
            ValueCodec::Exponential => Method::Exponential,
            ValueCodec::Periodic { .. } => Method::Periodic,
            ValueCodec::Quantized => Method::Quantized,
            ValueCodec::FixedWidth => Method::FixedWidth,
        }
    }

    /// Encodes `values` into a method-specific payload.
    ///
    /// Returns [`CodecError::Unsupported`] when the data falls outside the
    /// codec's pattern. An empty input always yields an empty payload.
    pub fn encode(&self, values: &[f64]) -> Result<Vec<u8>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        match *self {
            ValueCodec::Xor => Ok(xor::encode(values)),
            ValueCodec::Delta => Ok(delta::encode(values)),
            ValueCodec::NearConstant => near_constant::encode(values),
            ValueCodec::PowerOfTwo => power_of_two::encode(values),
            ValueCodec::IntegerDominant => Ok(integer::encode(values)),
            ValueCodec::Exponential => exponential::encode(values),
            ValueCodec::Periodic { period } => periodic::encode(values, period),
            ValueCodec::Quantized => quantized::encode(values),
            ValueCodec::FixedWidth => Ok(fixed::encode(values)),
        }
    }
}

impl std::fmt::Display for ValueCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueCodec::Periodic { period } => write!(f, "periodic({period})"),
            other => f.write_str(other.method().name()),
        }
    }
}

/// Decodes a value payload produced by the codec behind `method`.
pub fn decode(method: Method, payload: &[u8], count: usize) -> Result<Vec<f64>> {
    if count == 0 {
        if !payload.is_empty() {
            return Err(CodecError::malformed("payload present for an empty block"));
        }
        return Ok(Vec::new());
    }
    match method {
        Method::Xor => xor::decode(payload, count),
        Method::Delta => delta::decode(payload, count),
        Method::NearConstant => near_constant::decode(payload, count),
        Method::PowerOfTwo => power_of_two::decode(payload, count),
        Method::IntegerDominant => integer::decode(payload, count),
        Method::Exponential => exponential::decode(payload, count),
        Method::Periodic => periodic::decode(payload, count),
        Method::Quantized => quantized::decode(payload, count),
        Method::FixedWidth => fixed::decode(payload, count),
        Method::DoubleDelta => Err(CodecError::MethodMismatch {
            expected: "value",
            found: method,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ValueCodec; 9] = [
        ValueCodec::Xor,
        ValueCodec::Delta,
        ValueCodec::NearConstant,
        ValueCodec::PowerOfTwo,
        ValueCodec::IntegerDominant,
        ValueCodec::Exponential,
        ValueCodec::Periodic { period: 2 },
        ValueCodec::Quantized,
        ValueCodec::FixedWidth,
    ];

    #[test]
    fn test_every_codec_handles_powers_of_two() {
        // 1, 2, 1, 2 ... fits every pattern at once.
        let values: Vec<f64> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
        for codec in ALL {
            let payload = codec.encode(&values).unwrap_or_else(|e| panic!("{codec}: {e}"));
            let decoded = decode(codec.method(), &payload, values.len()).unwrap();
            assert_eq!(decoded, values, "{codec}");
        }
    }

    #[test]
    fn test_empty_input() {
        for codec in ALL {
            assert!(codec.encode(&[]).unwrap().is_empty());
            assert!(decode(codec.method(), &[], 0).unwrap().is_empty());
        }
        assert!(decode(Method::Xor, &[0], 0).is_err());
    }

    #[test]
    fn test_timestamp_tag_rejected() {
        assert!(matches!(
            decode(Method::DoubleDelta, &[0; 8], 1),
            Err(CodecError::MethodMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueCodec::Periodic { period: 24 }.to_string(), "periodic(24)");
        assert_eq!(ValueCodec::NearConstant.to_string(), "near_constant");
    }
}
