// CRC-32 over GF(2): polynomial 0x04C11DB7, MSB first, zero initial value,
// no reflection and no final XOR. The register value after all message bytes
// equals the remainder of M(x)·x^32 divided by the generator.

use tracing::debug;

use super::{CheckOutcome, Checked};
use crate::bits::{BitStream, bits_to_bytes, bytes_to_bits};
use crate::error::Result;
use crate::utils::consts::CRC32_POLY;

pub const CRC_BYTES: usize = 4;

/// Calculate the CRC-32 remainder for given data
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0;

    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            if (crc & 0x8000_0000) != 0 {
                crc = (crc << 1) ^ CRC32_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// Message bits followed by the 32-bit remainder
pub fn encode(bytes: &[u8]) -> BitStream {
    let crc = calculate_crc32(bytes);
    let mut out = Vec::with_capacity(bytes.len() + CRC_BYTES);
    out.extend_from_slice(bytes);
    out.extend_from_slice(&crc.to_be_bytes());
    bytes_to_bits(&out)
}

/// Split off the trailing remainder and compare it with a fresh one
pub fn check(bits: &[bool]) -> Result<Checked> {
    let bytes = bits_to_bytes(bits)?;
    if bytes.len() < CRC_BYTES {
        debug!("CRC codeword too short: {} bytes", bytes.len());
        return Ok(Checked {
            payload: bytes,
            outcome: CheckOutcome::Truncated { len: bits.len() },
        });
    }

    let (payload, tail) = bytes.split_at(bytes.len() - CRC_BYTES);
    let received = u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]);
    let computed = calculate_crc32(payload);

    let outcome = if received == computed {
        CheckOutcome::Clean
    } else {
        debug!(
            "CRC mismatch: received {:#010x}, computed {:#010x}",
            received, computed
        );
        CheckOutcome::ChecksumMismatch { received, computed }
    };

    Ok(Checked {
        payload: payload.to_vec(),
        outcome,
    })
}
