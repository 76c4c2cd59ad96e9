//! Error types for strata.

use thiserror::Error;

use crate::types::Method;

/// Core error type for strata codec operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("bit stream exhausted at bit {position}: requested {requested} bits, {remaining} remaining")]
    BitStreamExhausted {
        position: usize,
        requested: u32,
        remaining: usize,
    },

    #[error("unknown method tag: {0:#04x}")]
    UnknownMethod(u8),

    #[error("invalid varint encoding")]
    InvalidVarint,

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("data not supported by this codec: {0}")]
    Unsupported(&'static str),

    #[error("method mismatch: expected {expected} block, found {found}")]
    MethodMismatch { expected: &'static str, found: Method },

    #[error("series length mismatch: {timestamps} timestamps, {values} values")]
    LengthMismatch { timestamps: usize, values: usize },
}

impl CodecError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Failure to decode a block.
///
/// Wraps the underlying [`CodecError`] together with the method the block
/// claimed to use, when that much of the envelope could be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("corrupted block{}: {source}", method_suffix(.method))]
pub struct CorruptedBlock {
    pub method: Option<Method>,
    #[source]
    pub source: CodecError,
}

impl CorruptedBlock {
    pub fn new(method: Option<Method>, source: CodecError) -> Self {
        Self { method, source }
    }
}

impl From<CodecError> for CorruptedBlock {
    fn from(source: CodecError) -> Self {
        Self { method: None, source }
    }
}

fn method_suffix(method: &Option<Method>) -> String {
    match method {
        Some(m) => format!(" ({m})"),
        None => String::new(),
    }
}

/// Result type alias for strata operations.
pub type Result<T> = std::result::Result<T, CodecError>;
