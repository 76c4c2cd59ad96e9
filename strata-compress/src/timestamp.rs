//! Double-delta timestamp codec.
//!
//! ```text
//! Timestamps:     1000, 1015, 1030, 1045, 1061
//! Deltas:               15,   15,   15,   16
//! Double deltas:               0,    0,    1
//! ```
//!
//! Payload layout:
//!
//! 1. `first` (64 bits), then `first_delta` (64 bits) when there are at least
//!    two samples.
//! 2. The zero mask over the double deltas as `(is_zero: 1 bit, run: varint)`
//!    pairs, covering exactly `count - 2` positions.
//! 3. The non-zero double deltas in order, zig-zag varints.
//!
//! A perfectly regular series therefore costs a constant number of bytes no
//! matter how long it is. Arithmetic wraps, so any `i64` sequence
//! round-trips, monotonic or not.

use strata_core::varint::{zigzag_decode, zigzag_encode};
use strata_core::{CodecError, Result};

use crate::bitstream::{BitReader, BitWriter};

pub fn encode(timestamps: &[i64]) -> Vec<u8> {
    let Some(&first) = timestamps.first() else {
        return Vec::new();
    };
    let mut w = BitWriter::with_capacity(16 + timestamps.len() / 4);
    w.write_bits(first as u64, 64);
    if timestamps.len() == 1 {
        return w.finish();
    }

    let first_delta = timestamps[1].wrapping_sub(first);
    w.write_bits(first_delta as u64, 64);

    let mut prev_delta = first_delta;
    let dods: Vec<i64> = timestamps
        .windows(2)
        .skip(1)
        .map(|pair| {
            let delta = pair[1].wrapping_sub(pair[0]);
            let dod = delta.wrapping_sub(prev_delta);
            prev_delta = delta;
            dod
        })
        .collect();

    for (is_zero, run) in zero_runs(&dods) {
        w.write_bit(is_zero);
        w.write_uvarint(run as u64);
    }
    for &dod in dods.iter().filter(|&&d| d != 0) {
        w.write_uvarint(zigzag_encode(dod));
    }
    w.finish()
}

pub fn decode(payload: &[u8], count: usize) -> Result<Vec<i64>> {
    let mut r = BitReader::new(payload);
    if count == 0 {
        r.expect_end()?;
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(count.min(1 << 16));
    let first = r.read_bits(64)? as i64;
    out.push(first);
    if count == 1 {
        r.expect_end()?;
        return Ok(out);
    }

    let mut delta = r.read_bits(64)? as i64;
    let mut prev = first.wrapping_add(delta);
    out.push(prev);

    let expected = count - 2;
    let mut runs = Vec::new();
    let mut covered = 0usize;
    while covered < expected {
        let is_zero = r.read_bit()?;
        let run = r.read_uvarint()?;
        if run == 0 || run > (expected - covered) as u64 {
            return Err(CodecError::malformed(format!(
                "zero-mask run of {run} with {} positions left",
                expected - covered
            )));
        }
        covered += run as usize;
        runs.push((is_zero, run as usize));
    }

    for (is_zero, run) in runs {
        for _ in 0..run {
            if !is_zero {
                let dod = zigzag_decode(r.read_uvarint()?);
                if dod == 0 {
                    return Err(CodecError::malformed("zero stored in non-zero run"));
                }
                delta = delta.wrapping_add(dod);
            }
            prev = prev.wrapping_add(delta);
            out.push(prev);
        }
    }

    r.expect_end()?;
    Ok(out)
}

/// Maximal runs of zero / non-zero entries.
fn zero_runs(values: &[i64]) -> Vec<(bool, usize)> {
    let mut runs: Vec<(bool, usize)> = Vec::new();
    for &v in values {
        let is_zero = v == 0;
        match runs.last_mut() {
            Some((flag, len)) if *flag == is_zero => *len += 1,
            _ => runs.push((is_zero, 1)),
        }
    }
    runs
}
