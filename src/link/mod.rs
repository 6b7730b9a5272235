//! Data-link layer: framing plus error detection and correction.

pub mod crc;
pub mod error_control;
pub mod framing;
pub mod hamming;
pub mod parity;

use serde::Serialize;

/// Result of checking a received codeword.
///
/// None of these abort the pipeline. A detected error travels next to the
/// payload so the receiver can still show what arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckOutcome {
    /// No error detected
    Clean,
    /// Parity or CRC did not match; payload is returned uncorrected
    ChecksumMismatch { received: u32, computed: u32 },
    /// Codeword too short to carry its check bits
    Truncated { len: usize },
    /// Hamming flipped the bit at this 1-indexed codeword position
    Corrected { position: usize },
    /// Hamming syndrome points outside the codeword, nothing was flipped
    Uncorrectable { syndrome: usize },
}

impl CheckOutcome {
    pub fn error_detected(&self) -> bool {
        !matches!(self, CheckOutcome::Clean)
    }
}

/// Payload recovered by an error-control decoder, with its check outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked {
    pub payload: Vec<u8>,
    pub outcome: CheckOutcome,
}

impl Checked {
    pub fn clean(payload: Vec<u8>) -> Self {
        Self {
            payload,
            outcome: CheckOutcome::Clean,
        }
    }

    pub fn error_detected(&self) -> bool {
        self.outcome.error_detected()
    }
}
