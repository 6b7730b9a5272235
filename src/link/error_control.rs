use tracing::debug;

use super::{Checked, crc, hamming, parity};
use crate::bits::{BitStream, bits_to_bytes, bytes_to_bits};
use crate::config::ErrorControl;
use crate::error::Result;

impl ErrorControl {
    /// Encode framed bytes into the bit stream handed to the line coder.
    /// `None` still produces a bit stream so downstream stages never branch.
    pub fn encode(self, bytes: &[u8]) -> BitStream {
        let bits = match self {
            ErrorControl::None => bytes_to_bits(bytes),
            ErrorControl::Parity => parity::encode(bytes),
            ErrorControl::Crc32 => crc::encode(bytes),
            ErrorControl::Hamming => hamming::encode(bytes),
        };
        debug!("{} encode: {} bytes -> {} bits", self, bytes.len(), bits.len());
        bits
    }

    /// Check (and for Hamming, correct) a received bit stream.
    pub fn decode(self, bits: &[bool]) -> Result<Checked> {
        let checked = match self {
            ErrorControl::None => Checked::clean(bits_to_bytes(bits)?),
            ErrorControl::Parity => parity::check(bits)?,
            ErrorControl::Crc32 => crc::check(bits)?,
            ErrorControl::Hamming => hamming::decode(bits)?,
        };
        debug!(
            "{} decode: {} bits -> {} bytes ({:?})",
            self,
            bits.len(),
            checked.payload.len(),
            checked.outcome
        );
        Ok(checked)
    }

    /// Whether `n` bits can be a codeword produced by [`ErrorControl::encode`]
    /// for some whole number of bytes.
    pub fn admits_codeword_len(self, n: usize) -> bool {
        match self {
            ErrorControl::None => n % 8 == 0,
            ErrorControl::Parity => n % 8 == 1,
            ErrorControl::Crc32 => n % 8 == 0 && n >= 32,
            ErrorControl::Hamming => {
                let m = n - hamming::parity_bits_for_codeword(n);
                m % 8 == 0 && hamming::codeword_len(m) == n
            }
        }
    }
}
