//!
//! Compression algorithm selector for the database payload.
//!
//! The numeric value of each variant is written to disk by the persistence layer,
//! so existing values must never be renumbered. New algorithms get the next free
//! ordinal and `COMPRESSION_ALGORITHM_MAX` moves with them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compression applied to the database payload before encryption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum CompressionAlgorithm {
    None = 0,
    #[default]
    GZip = 1,
}

/// The highest ordinal currently assigned.
pub const COMPRESSION_ALGORITHM_MAX: CompressionAlgorithm = CompressionAlgorithm::GZip;

impl CompressionAlgorithm {
    /// The persisted ordinal of this algorithm.
    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

impl From<CompressionAlgorithm> for u32 {
    fn from(algo: CompressionAlgorithm) -> Self {
        algo.ordinal()
    }
}

impl TryFrom<u32> for CompressionAlgorithm {
    type Error = Error;

    /// Unknown ordinals are rejected rather than coerced to a default.
    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(CompressionAlgorithm::None),
            1 => Ok(CompressionAlgorithm::GZip),
            other => Err(Error::UnknownCompressionAlgorithm(other)),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionAlgorithm::None => write!(f, "none"),
            CompressionAlgorithm::GZip => write!(f, "gzip"),
        }
    }
}
