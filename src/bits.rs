//! Conversions between text, bytes and raw bit sequences. All bit orders are MSB first.

use tracing::warn;

use crate::error::{LinkSimError, Result};

/// Ordered sequence of bits, most significant bit of each byte first
pub type BitStream = Vec<bool>;

/// Convert byte to bit array (MSB first)
pub fn byte_to_bits(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - i)) & 1 == 1;
    }
    bits
}

/// Convert up to 8 bits to a byte (MSB first)
pub fn bits_to_byte(bits: &[bool]) -> u8 {
    let mut byte = 0u8;
    for (i, &bit) in bits.iter().enumerate().take(8) {
        if bit {
            byte |= 1 << (7 - i);
        }
    }
    byte
}

/// Encode text as one byte per character. Only 7-bit ASCII is representable.
pub fn text_to_bytes(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .enumerate()
        .map(|(position, character)| {
            if character.is_ascii() {
                Ok(character as u8)
            } else {
                Err(LinkSimError::Encoding {
                    character,
                    position,
                })
            }
        })
        .collect()
}

pub fn text_to_bits(text: &str) -> Result<BitStream> {
    Ok(bytes_to_bits(&text_to_bytes(text)?))
}

/// Decode bytes back to text. Bytes outside ASCII can only appear after
/// uncorrected channel errors; they are replaced rather than failing the run.
pub fn bytes_to_text(bytes: &[u8]) -> String {
    let mut replaced = 0usize;
    let text = bytes
        .iter()
        .map(|&byte| {
            if byte.is_ascii() {
                byte as char
            } else {
                replaced += 1;
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect();
    if replaced > 0 {
        warn!("{} non-ASCII byte(s) replaced while decoding text", replaced);
    }
    text
}

pub fn bytes_to_bits(bytes: &[u8]) -> BitStream {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        bits.extend_from_slice(&byte_to_bits(byte));
    }
    bits
}

/// Group bits into bytes. The stream must be byte aligned; trailing bits are
/// never dropped silently.
pub fn bits_to_bytes(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(LinkSimError::BitAlignment { len: bits.len() });
    }
    Ok(bits.chunks_exact(8).map(bits_to_byte).collect())
}

pub fn bits_to_bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}

pub fn bit_string_to_bits(bit_string: &str) -> Result<BitStream> {
    bit_string
        .chars()
        .enumerate()
        .map(|(position, character)| match character {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(LinkSimError::InvalidBitChar {
                character,
                position,
            }),
        })
        .collect()
}

pub fn bytes_to_bit_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:08b}")).collect()
}

pub fn bit_string_to_bytes(bit_string: &str) -> Result<Vec<u8>> {
    bits_to_bytes(&bit_string_to_bits(bit_string)?)
}
