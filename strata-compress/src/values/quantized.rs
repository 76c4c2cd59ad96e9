//! Quantized (dictionary) codec.
//!
//! Builds the sorted set of distinct bit patterns (at most
//! [`MAX_DICTIONARY`]) and replaces each element by its dictionary index,
//! either bit-packed at `ceil(log2(size))` bits or, when that is smaller, as
//! `(index, run length)` pairs.
//!
//! Layout: `size: varint`, `size` raw values, 1-bit mode (0 packed, 1 runs),
//! then the indices.

use std::cmp::Ordering;

use strata_core::varint::uvarint_len;
use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

pub const MAX_DICTIONARY: usize = 256;

/// Bits per packed index for a dictionary of `size` entries.
pub fn index_width(size: usize) -> u32 {
    if size <= 1 {
        0
    } else {
        usize::BITS - (size - 1).leading_zeros()
    }
}

fn cmp_bits(a: &u64, b: &u64) -> Ordering {
    f64::from_bits(*a).total_cmp(&f64::from_bits(*b))
}

/// Sorted distinct bit patterns, or `None` once more than `limit` show up.
pub fn dictionary(values: &[f64], limit: usize) -> Option<Vec<u64>> {
    let mut seen: Vec<u64> = Vec::new();
    for v in values {
        let bits = v.to_bits();
        if let Err(pos) = seen.binary_search_by(|probe| cmp_bits(probe, &bits)) {
            if seen.len() == limit {
                return None;
            }
            seen.insert(pos, bits);
        }
    }
    Some(seen)
}

pub fn encode(values: &[f64]) -> Result<Vec<u8>> {
    let dict = dictionary(values, MAX_DICTIONARY)
        .ok_or(CodecError::Unsupported("too many distinct values"))?;
    let width = index_width(dict.len());
    let indices: Vec<u64> = values
        .iter()
        .map(|v| {
            let bits = v.to_bits();
            dict.binary_search_by(|probe| cmp_bits(probe, &bits))
                .map(|i| i as u64)
                .map_err(|_| CodecError::malformed("value missing from dictionary"))
        })
        .collect::<Result<_>>()?;

    let runs = index_runs(&indices);
    let packed_bits = indices.len() * width as usize;
    let run_bits: usize = runs
        .iter()
        .map(|&(_, len)| width as usize + 8 * uvarint_len(len as u64))
        .sum();

    let mut w = BitWriter::with_capacity(2 + dict.len() * 8 + packed_bits.min(run_bits) / 8);
    w.write_uvarint(dict.len() as u64);
    for &bits in &dict {
        w.write_bits(bits, 64);
    }
    if run_bits < packed_bits {
        w.write_bit(true);
        for (index, len) in runs {
            w.write_bits(index, width);
            w.write_uvarint(len as u64);
        }
    } else {
        w.write_bit(false);
        for index in indices {
            w.write_bits(index, width);
        }
    }
    Ok(w.finish())
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut r = BitReader::new(payload);
    let size = r.read_uvarint()?;
    if size == 0 || size > MAX_DICTIONARY as u64 {
        return Err(CodecError::malformed(format!("dictionary size {size}")));
    }
    let dict = (0..size)
        .map(|_| r.read_f64())
        .collect::<Result<Vec<_>>>()?;
    let width = index_width(dict.len());
    let lookup = |index: u64| {
        dict.get(index as usize)
            .copied()
            .ok_or_else(|| CodecError::malformed(format!("index {index} past dictionary")))
    };

    let mut out = Vec::with_capacity(count.min(1 << 16));
    if r.read_bit()? {
        while out.len() < count {
            let value = lookup(r.read_bits(width)?)?;
            let len = r.read_uvarint()?;
            if len == 0 || len > (count - out.len()) as u64 {
                return Err(CodecError::malformed(format!("run of {len} values")));
            }
            out.extend(std::iter::repeat(value).take(len as usize));
        }
    } else {
        for _ in 0..count {
            out.push(lookup(r.read_bits(width)?)?);
        }
    }
    r.expect_end()?;
    Ok(out)
}

fn index_runs(indices: &[u64]) -> Vec<(u64, usize)> {
    let mut runs: Vec<(u64, usize)> = Vec::new();
    for &index in indices {
        match runs.last_mut() {
            Some((last, len)) if *last == index => *len += 1,
            _ => runs.push((index, 1)),
        }
    }
    runs
}
