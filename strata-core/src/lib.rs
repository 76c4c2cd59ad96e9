//! Core types for the strata time-series codec: method tags, the block
//! envelope, shared varint primitives, configuration and errors.

pub mod config;
pub mod error;
pub mod types;
pub mod varint;

pub use config::*;
pub use error::*;
pub use types::*;
