//! Error types for the link simulator.
//!
//! Only conditions that abort a pipeline run live here. Checksum mismatches and
//! Hamming corrections are reported through [`crate::link::CheckOutcome`]
//! alongside the decoded payload instead.

use thiserror::Error;

/// Top-level error type for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum LinkSimError {
    /// Input text contains a character outside 7-bit ASCII
    #[error("character {character:?} at position {position} is not representable in one byte")]
    Encoding { character: char, position: usize },

    /// A bit string contained something other than '0' or '1'
    #[error("invalid bit character {character:?} at position {position}")]
    InvalidBitChar { character: char, position: usize },

    /// Frame structure could not be recovered
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// A bit stream had to be grouped into bytes but was not a multiple of 8 long
    #[error("bit stream of length {len} is not byte aligned")]
    BitAlignment { len: usize },

    /// Unrecognized scheme or method label
    #[error("unsupported {axis}: {value:?}")]
    UnsupportedScheme { axis: &'static str, value: String },

    /// Scheme configuration failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// Wire record could not be parsed
    #[error("wire format error: {0}")]
    Wire(#[from] WireError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Deframing failures. Both are fatal for the current message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// A character-count header promised more bytes than remain
    #[error("frame at offset {offset} declares {declared} bytes but only {available} remain")]
    LengthOverrun {
        declared: usize,
        available: usize,
        offset: usize,
    },

    /// Byte-stuffed stream ended right after an escape byte
    #[error("escape byte at offset {offset} has nothing to escape")]
    DanglingEscape { offset: usize },

    /// Frame size must fit the one-byte length header and be non-zero
    #[error("max frame size {0} outside 1..=255")]
    InvalidMaxFrameSize(usize),
}

/// Wire record parsing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("record is missing the END_OF_SEQUENCE marker")]
    MissingSentinel,

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field {field} has invalid number {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("carrier {scheme} is missing its parameters")]
    MissingCarrierParam { scheme: &'static str },
}

pub type Result<T> = std::result::Result<T, LinkSimError>;
