//! Whole-series helpers: paired timestamp/value encoding and batch fan-out.

use rayon::prelude::*;
use strata_core::{CodecError, CompressedBlock, CorruptedBlock, Result};

use crate::select::Selector;
use crate::{decode_timestamps, decode_values, encode_timestamps};

/// One series as two parallel arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(timestamps: Vec<i64>, values: Vec<f64>) -> Result<Self> {
        let series = Self { timestamps, values };
        series.check_lengths()?;
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn check_lengths(&self) -> Result<()> {
        if self.timestamps.len() != self.values.len() {
            return Err(CodecError::LengthMismatch {
                timestamps: self.timestamps.len(),
                values: self.values.len(),
            });
        }
        Ok(())
    }
}

/// The two blocks of an encoded series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedSeries {
    pub timestamps: CompressedBlock,
    pub values: CompressedBlock,
}

impl EncodedSeries {
    /// Combined envelope size of both blocks.
    pub fn encoded_size(&self) -> usize {
        self.timestamps.encoded_size() + self.values.encoded_size()
    }
}

impl Selector {
    pub fn encode_series(&self, series: &Series) -> Result<EncodedSeries> {
        series.check_lengths()?;
        Ok(EncodedSeries {
            timestamps: encode_timestamps(&series.timestamps),
            values: self.encode_values(&series.values),
        })
    }

    /// Encodes independent series in parallel. Output order follows input.
    pub fn encode_batch(&self, batch: &[Series]) -> Vec<Result<EncodedSeries>> {
        batch
            .par_iter()
            .map(|series| self.encode_series(series))
            .collect()
    }
}

pub fn decode_series(encoded: &EncodedSeries) -> std::result::Result<Series, CorruptedBlock> {
    if encoded.timestamps.count != encoded.values.count {
        return Err(CodecError::LengthMismatch {
            timestamps: encoded.timestamps.count as usize,
            values: encoded.values.count as usize,
        }
        .into());
    }
    Ok(Series {
        timestamps: decode_timestamps(&encoded.timestamps)?,
        values: decode_values(&encoded.values)?,
    })
}
