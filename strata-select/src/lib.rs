//! Adaptive time-series compression for strata.
//!
//! The public surface is four functions:
//!
//! ```rust
//! use strata_select::{decode_timestamps, decode_values, encode_timestamps, encode_values};
//!
//! let timestamps = [1000, 1015, 1030, 1045];
//! let values = [45.2, 47.1, 43.8, 46.5];
//!
//! let ts_block = encode_timestamps(&timestamps);
//! let value_block = encode_values(&values);
//!
//! assert_eq!(decode_timestamps(&ts_block).unwrap(), timestamps);
//! assert_eq!(decode_values(&value_block).unwrap(), values);
//! ```
//!
//! Values go through the [`Selector`]: the classifier shortlists codecs, every
//! candidate is decoded and checked against the input, and the smallest
//! verified payload wins. Decoding looks only at the block's method tag.
//! Everything is stateless, so independent series can be encoded from as
//! many threads as the caller likes.

pub mod classify;
pub mod select;
pub mod series;

pub use classify::classify;
pub use select::{CandidateOutcome, CandidateReport, Selection, Selector};
pub use series::{decode_series, EncodedSeries, Series};
pub use strata_compress::ValueCodec;
pub use strata_core::{CodecConfig, CodecError, CompressedBlock, CorruptedBlock, Method};

use strata_compress::{block_len, timestamp, values};

/// Encodes a timestamp array with the double-delta codec.
pub fn encode_timestamps(timestamps: &[i64]) -> CompressedBlock {
    CompressedBlock::new(
        Method::DoubleDelta,
        timestamps.len() as u64,
        timestamp::encode(timestamps),
    )
}

pub fn decode_timestamps(block: &CompressedBlock) -> Result<Vec<i64>, CorruptedBlock> {
    let wrap = |e| CorruptedBlock::new(Some(block.method), e);
    if block.method.is_value_method() {
        return Err(wrap(CodecError::MethodMismatch {
            expected: "timestamp",
            found: block.method,
        }));
    }
    let count = block_len(block.count).map_err(wrap)?;
    timestamp::decode(&block.payload, count).map_err(wrap)
}

/// Encodes a value array with the smallest verified codec under the default
/// configuration.
pub fn encode_values(values: &[f64]) -> CompressedBlock {
    Selector::default().encode_values(values)
}

pub fn decode_values(block: &CompressedBlock) -> Result<Vec<f64>, CorruptedBlock> {
    let wrap = |e| CorruptedBlock::new(Some(block.method), e);
    let count = block_len(block.count).map_err(wrap)?;
    values::decode(block.method, &block.payload, count).map_err(wrap)
}

/// Parses a serialized block and decodes it as values.
pub fn decode_values_bytes(bytes: &[u8]) -> Result<Vec<f64>, CorruptedBlock> {
    decode_values(&CompressedBlock::from_bytes(bytes)?)
}

/// Parses a serialized block and decodes it as timestamps.
pub fn decode_timestamps_bytes(bytes: &[u8]) -> Result<Vec<i64>, CorruptedBlock> {
    decode_timestamps(&CompressedBlock::from_bytes(bytes)?)
}
