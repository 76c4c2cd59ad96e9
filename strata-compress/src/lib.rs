//! Bit-level codecs for strata.
//!
//! - [`bitstream`]: MSB-first bit writer/reader every payload is built on.
//! - [`timestamp`]: double-delta timestamp codec with run-length zero mask.
//! - [`values`]: the value codec library behind the closed [`ValueCodec`] set.
//! - [`residual`]: zero-skip residual words shared by the deviation codecs.
//!
//! Everything here is a pure function of its input; nothing chooses between
//! codecs. That is the job of `strata-select`.

pub mod bitstream;
pub mod residual;
pub mod timestamp;
pub mod values;

pub use bitstream::{BitReader, BitWriter};
pub use values::ValueCodec;

use strata_core::{CodecError, Result};

/// Largest element count a block may claim.
///
/// Several payloads describe arbitrarily long runs in a few bytes, so the
/// count in an untrusted envelope is bounded before any decoder sizes its
/// output from it.
pub const MAX_BLOCK_LEN: u64 = 1 << 28;

/// Converts an envelope count to a length, rejecting absurd values.
pub fn block_len(count: u64) -> Result<usize> {
    if count > MAX_BLOCK_LEN {
        return Err(CodecError::malformed(format!(
            "block claims {count} elements, limit is {MAX_BLOCK_LEN}"
        )));
    }
    usize::try_from(count).map_err(|_| CodecError::malformed("count exceeds address space"))
}
