//! Core type definitions for strata.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CodecError, CorruptedBlock};
use crate::varint::{get_uvarint, put_uvarint, uvarint_len};

/// Identifies the algorithm that produced a block's payload.
///
/// The discriminant is the `method_tag` byte written at the front of every
/// serialized block. Tags are part of the wire format and must never be
/// renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Method {
    Xor = 0x01,
    Delta = 0x02,
    NearConstant = 0x03,
    PowerOfTwo = 0x04,
    IntegerDominant = 0x05,
    Exponential = 0x06,
    Periodic = 0x07,
    Quantized = 0x08,
    FixedWidth = 0x09,
    /// Timestamp codec. Never produced for value arrays.
    DoubleDelta = 0x10,
}

impl Method {
    /// Every value method, in tie-break priority order.
    pub const VALUE_METHODS: [Method; 9] = [
        Method::Xor,
        Method::Delta,
        Method::IntegerDominant,
        Method::PowerOfTwo,
        Method::NearConstant,
        Method::Periodic,
        Method::Exponential,
        Method::Quantized,
        Method::FixedWidth,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Method::Xor),
            0x02 => Some(Method::Delta),
            0x03 => Some(Method::NearConstant),
            0x04 => Some(Method::PowerOfTwo),
            0x05 => Some(Method::IntegerDominant),
            0x06 => Some(Method::Exponential),
            0x07 => Some(Method::Periodic),
            0x08 => Some(Method::Quantized),
            0x09 => Some(Method::FixedWidth),
            0x10 => Some(Method::DoubleDelta),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Xor => "xor",
            Method::Delta => "delta",
            Method::NearConstant => "near_constant",
            Method::PowerOfTwo => "power_of_two",
            Method::IntegerDominant => "integer_dominant",
            Method::Exponential => "exponential",
            Method::Periodic => "periodic",
            Method::Quantized => "quantized",
            Method::FixedWidth => "fixed_width",
            Method::DoubleDelta => "double_delta",
        }
    }

    /// Tie-break rank among equally sized candidates; lower wins.
    pub fn priority(self) -> u8 {
        Self::VALUE_METHODS
            .iter()
            .position(|m| *m == self)
            .map_or(u8::MAX, |p| p as u8)
    }

    /// Whether decoded output must match the input bit for bit.
    ///
    /// Deviation-based methods are only held to the configured tolerance.
    pub fn is_bit_exact(self) -> bool {
        !matches!(
            self,
            Method::NearConstant | Method::Exponential | Method::Periodic
        )
    }

    pub fn is_value_method(self) -> bool {
        self != Method::DoubleDelta
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One encoded array: the method tag, the element count and the opaque
/// method-specific payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedBlock {
    pub method: Method,
    pub count: u64,
    pub payload: Vec<u8>,
}

impl CompressedBlock {
    pub fn new(method: Method, count: u64, payload: Vec<u8>) -> Self {
        Self {
            method,
            count,
            payload,
        }
    }

    /// Block for a zero-length array.
    pub fn empty(method: Method) -> Self {
        Self::new(method, 0, Vec::new())
    }

    /// Serializes to `[tag: u8][count: varint][payload]`.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        buf.put_u8(self.method.tag());
        put_uvarint(&mut buf, self.count);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parses a serialized block. Unknown tags are rejected outright.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CorruptedBlock> {
        let mut buf = data;
        if !buf.has_remaining() {
            return Err(CodecError::BitStreamExhausted {
                position: 0,
                requested: 8,
                remaining: 0,
            }
            .into());
        }
        let tag = buf.get_u8();
        let method = Method::from_tag(tag).ok_or(CodecError::UnknownMethod(tag))?;
        let count =
            get_uvarint(&mut buf).map_err(|e| CorruptedBlock::new(Some(method), e))?;
        Ok(Self {
            method,
            count,
            payload: buf.to_vec(),
        })
    }

    /// Length of the serialized envelope in bytes.
    pub fn encoded_size(&self) -> usize {
        1 + uvarint_len(self.count) + self.payload.len()
    }

    /// Size of the original array as raw 8-byte elements.
    /// Saturates for counts no real array could have.
    pub fn raw_size(&self) -> usize {
        usize::try_from(self.count)
            .unwrap_or(usize::MAX)
            .saturating_mul(8)
    }

    pub fn compression_ratio(&self) -> f64 {
        self.raw_size() as f64 / self.encoded_size().max(1) as f64
    }
}

impl fmt::Debug for CompressedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview = &self.payload[..self.payload.len().min(16)];
        f.debug_struct("CompressedBlock")
            .field("method", &self.method)
            .field("count", &self.count)
            .field("payload_len", &self.payload.len())
            .field("payload", &format_args!("{}", hex::encode(preview)))
            .finish()
    }
}
