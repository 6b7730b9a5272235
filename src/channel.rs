//! Simulated noisy channel: independent bit flips on the encoded stream.

use rand::Rng;
use tracing::{debug, trace};

use crate::bits::BitStream;
use crate::error::{LinkSimError, Result};

/// Probabilities are expressed in flips per thousand bits
pub const PER_MILLE_MAX: u32 = 1000;

/// Flip each bit independently with probability `per_mille / 1000`.
pub fn apply_bit_errors<R: Rng + ?Sized>(
    bits: &[bool],
    per_mille: u32,
    rng: &mut R,
) -> Result<BitStream> {
    if per_mille > PER_MILLE_MAX {
        return Err(LinkSimError::Config(format!(
            "bit error probability {per_mille}‰ exceeds {PER_MILLE_MAX}‰"
        )));
    }
    if per_mille == 0 {
        return Ok(bits.to_vec());
    }

    let mut flipped = 0usize;
    let noisy: BitStream = bits
        .iter()
        .enumerate()
        .map(|(i, &bit)| {
            if rng.random_range(0..PER_MILLE_MAX) < per_mille {
                trace!("Channel flipped bit {}", i);
                flipped += 1;
                !bit
            } else {
                bit
            }
        })
        .collect();

    debug!(
        "Channel: {} of {} bits flipped at {}‰",
        flipped,
        bits.len(),
        per_mille
    );
    Ok(noisy)
}

/// Number of positions at which two equal-length streams differ
pub fn hamming_distance(a: &[bool], b: &[bool]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}
