//! Single-error-correcting Hamming code over the whole message.
//!
//! Codeword positions are 1-indexed. Positions that are powers of two hold parity
//! bits; parity bit `2^i` covers every position with bit `i` set. The decoder sums
//! the failing parity positions into a syndrome that names the flipped bit.
//!
//! Known limitation: two flipped bits produce a syndrome that points at a third,
//! innocent position, which then gets "corrected". Only single errors are
//! recoverable.

use tracing::{debug, info};

use super::{CheckOutcome, Checked};
use crate::bits::{BitStream, bits_to_bytes, bytes_to_bits};
use crate::error::Result;

fn is_parity_position(position: usize) -> bool {
    position.is_power_of_two()
}

/// Smallest `r` with `2^r >= m + r + 1`
pub fn parity_bits_for_data(m: usize) -> usize {
    let mut r = 0;
    while (1usize << r) < m + r + 1 {
        r += 1;
    }
    r
}

/// Smallest `r` with `2^r >= n + 1`
pub fn parity_bits_for_codeword(n: usize) -> usize {
    let mut r = 0;
    while (1usize << r) < n + 1 {
        r += 1;
    }
    r
}

/// Codeword length for `m` data bits
pub fn codeword_len(m: usize) -> usize {
    m + parity_bits_for_data(m)
}

/// XOR of every 1-indexed position covered by parity position `pos`
fn parity_over(code: &[bool], pos: usize) -> bool {
    code.iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) & pos != 0)
        .fold(false, |acc, (_, &bit)| acc ^ bit)
}

pub fn encode_bits(data: &[bool]) -> BitStream {
    let r = parity_bits_for_data(data.len());
    let n = data.len() + r;

    let mut data_iter = data.iter();
    let mut code: BitStream = (1..=n)
        .map(|position| {
            if is_parity_position(position) {
                false
            } else {
                data_iter.next().copied().unwrap_or(false)
            }
        })
        .collect();

    for i in 0..r {
        let pos = 1 << i;
        code[pos - 1] = parity_over(&code, pos);
    }

    code
}

pub fn encode(bytes: &[u8]) -> BitStream {
    let data = bytes_to_bits(bytes);
    let code = encode_bits(&data);
    debug!(
        "Hamming: {} data bits -> {} codeword bits",
        data.len(),
        code.len()
    );
    code
}

/// Correct at most one flipped bit and strip the parity positions.
pub fn correct_bits(received: &[bool]) -> (BitStream, CheckOutcome) {
    let n = received.len();
    let r = parity_bits_for_codeword(n);
    let mut code = received.to_vec();

    let syndrome: usize = (0..r)
        .map(|i| 1usize << i)
        .filter(|&pos| parity_over(&code, pos))
        .sum();

    let outcome = match syndrome {
        0 => CheckOutcome::Clean,
        position if position <= n => {
            info!("Hamming: correcting bit at position {}", position);
            code[position - 1] = !code[position - 1];
            CheckOutcome::Corrected { position }
        }
        syndrome => {
            info!(
                "Hamming: syndrome {} outside codeword of {} bits",
                syndrome, n
            );
            CheckOutcome::Uncorrectable { syndrome }
        }
    };

    let data = code
        .iter()
        .enumerate()
        .filter(|(i, _)| !is_parity_position(i + 1))
        .map(|(_, &bit)| bit)
        .collect();

    (data, outcome)
}

pub fn decode(bits: &[bool]) -> Result<Checked> {
    let (data, outcome) = correct_bits(bits);
    Ok(Checked {
        payload: bits_to_bytes(&data)?,
        outcome,
    })
}
