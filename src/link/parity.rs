// Even parity: one trailing bit makes the number of 1-bits even.

use tracing::debug;

use super::{CheckOutcome, Checked};
use crate::bits::{BitStream, bits_to_bytes, bytes_to_bits};
use crate::error::Result;

pub fn parity_of(bits: &[bool]) -> bool {
    bits.iter().fold(false, |acc, &bit| acc ^ bit)
}

/// Append the even-parity bit to the message bits
pub fn encode(bytes: &[u8]) -> BitStream {
    let mut bits = bytes_to_bits(bytes);
    let parity = parity_of(&bits);
    bits.push(parity);
    bits
}

/// Recompute parity over all bits but the last and compare
pub fn check(bits: &[bool]) -> Result<Checked> {
    let Some((&received, data)) = bits.split_last() else {
        return Ok(Checked {
            payload: Vec::new(),
            outcome: CheckOutcome::Truncated { len: 0 },
        });
    };

    let payload = bits_to_bytes(data)?;
    let computed = parity_of(data);
    if computed == received {
        return Ok(Checked::clean(payload));
    }

    debug!("Parity mismatch over {} data bits", data.len());
    Ok(Checked {
        payload,
        outcome: CheckOutcome::ChecksumMismatch {
            received: received as u32,
            computed: computed as u32,
        },
    })
}
