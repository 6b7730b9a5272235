//! Character-count and byte-stuffing framing.
//!
//! Character count: `[len:1][payload:len]` repeated.
//! Byte stuffing:   `FLAG payload FLAG` repeated, where any FLAG or ESC inside the
//! payload is preceded by one ESC.
//!
//! An empty payload still produces one (empty) frame so the receiver always has
//! something to deframe.

use tracing::{debug, trace};

use crate::config::FramingMethod;
use crate::error::FramingError;
use crate::utils::consts::{ESC, FLAG, MAX_FRAME_SIZE_LIMIT};

fn check_max_frame_size(max_frame_size: usize) -> Result<(), FramingError> {
    if max_frame_size == 0 || max_frame_size > MAX_FRAME_SIZE_LIMIT {
        return Err(FramingError::InvalidMaxFrameSize(max_frame_size));
    }
    Ok(())
}

/// Split the payload into chunks of at most `max_frame_size` bytes.
/// Yields a single empty chunk for an empty payload.
fn chunks(payload: &[u8], max_frame_size: usize) -> Vec<&[u8]> {
    if payload.is_empty() {
        vec![payload]
    } else {
        payload.chunks(max_frame_size).collect()
    }
}

pub fn frame_character_count(payload: &[u8], max_frame_size: usize) -> Result<Vec<u8>, FramingError> {
    check_max_frame_size(max_frame_size)?;

    let frames = chunks(payload, max_frame_size);
    let mut out = Vec::with_capacity(payload.len() + frames.len());
    for chunk in &frames {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }

    debug!(
        "Character-count framing: {} bytes -> {} frames, {} bytes",
        payload.len(),
        frames.len(),
        out.len()
    );
    Ok(out)
}

pub fn deframe_character_count(stream: &[u8]) -> Result<Vec<u8>, FramingError> {
    let mut payload = Vec::with_capacity(stream.len());
    let mut offset = 0;

    while offset < stream.len() {
        let declared = stream[offset] as usize;
        let available = stream.len() - offset - 1;
        if declared > available {
            return Err(FramingError::LengthOverrun {
                declared,
                available,
                offset,
            });
        }
        trace!("Frame at offset {}: {} bytes", offset, declared);
        payload.extend_from_slice(&stream[offset + 1..offset + 1 + declared]);
        offset += 1 + declared;
    }

    Ok(payload)
}

pub fn frame_byte_stuffing(payload: &[u8], max_frame_size: usize) -> Result<Vec<u8>, FramingError> {
    check_max_frame_size(max_frame_size)?;

    let frames = chunks(payload, max_frame_size);
    let mut out = Vec::with_capacity(payload.len() + 2 * frames.len());
    let mut escaped = 0usize;
    for chunk in &frames {
        out.push(FLAG);
        for &byte in chunk.iter() {
            if byte == FLAG || byte == ESC {
                out.push(ESC);
                escaped += 1;
            }
            out.push(byte);
        }
        out.push(FLAG);
    }

    debug!(
        "Byte-stuffing framing: {} bytes -> {} frames, {} escapes, {} bytes",
        payload.len(),
        frames.len(),
        escaped,
        out.len()
    );
    Ok(out)
}

pub fn deframe_byte_stuffing(stream: &[u8]) -> Result<Vec<u8>, FramingError> {
    let mut payload = Vec::with_capacity(stream.len());
    let mut escape_pending = false;

    for &byte in stream {
        if escape_pending {
            payload.push(byte);
            escape_pending = false;
        } else if byte == FLAG {
            continue;
        } else if byte == ESC {
            escape_pending = true;
        } else {
            payload.push(byte);
        }
    }

    if escape_pending {
        return Err(FramingError::DanglingEscape {
            offset: stream.len() - 1,
        });
    }
    Ok(payload)
}

impl FramingMethod {
    pub fn frame(self, payload: &[u8], max_frame_size: usize) -> Result<Vec<u8>, FramingError> {
        match self {
            FramingMethod::CharacterCount => frame_character_count(payload, max_frame_size),
            FramingMethod::ByteStuffing => frame_byte_stuffing(payload, max_frame_size),
        }
    }

    pub fn deframe(self, stream: &[u8]) -> Result<Vec<u8>, FramingError> {
        match self {
            FramingMethod::CharacterCount => deframe_character_count(stream),
            FramingMethod::ByteStuffing => deframe_byte_stuffing(stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_count_layout() {
        let framed = frame_character_count(b"Hello", 4).unwrap();
        assert_eq!(framed, vec![4, b'H', b'e', b'l', b'l', 1, b'o']);
        assert_eq!(deframe_character_count(&framed).unwrap(), b"Hello");
    }

    #[test]
    fn test_boundary_lengths_round_trip() {
        let max = 4;
        for len in [0, 1, max, max + 1] {
            let payload: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
            for method in FramingMethod::ALL {
                let framed = method.frame(&payload, max).unwrap();
                assert_eq!(method.deframe(&framed).unwrap(), payload, "{method} len={len}");
            }
        }
    }

    #[test]
    fn test_empty_payload_emits_one_frame() {
        assert_eq!(frame_character_count(&[], 4).unwrap(), vec![0]);
        assert_eq!(frame_byte_stuffing(&[], 4).unwrap(), vec![FLAG, FLAG]);
    }

    #[test]
    fn test_byte_stuffing_escapes_flag_and_esc() {
        let payload = [FLAG, b'a', ESC, b'b', FLAG];
        let framed = frame_byte_stuffing(&payload, 4).unwrap();
        assert_eq!(
            framed,
            vec![FLAG, ESC, FLAG, b'a', ESC, ESC, b'b', FLAG, FLAG, ESC, FLAG, FLAG]
        );
        assert_eq!(framed.first(), Some(&FLAG));
        assert_eq!(framed.last(), Some(&FLAG));
        assert_eq!(deframe_byte_stuffing(&framed).unwrap(), payload);
    }

    #[test]
    fn test_length_overrun_is_fatal() {
        let err = deframe_character_count(&[2, b'a', 5, b'b']).unwrap_err();
        assert_eq!(
            err,
            FramingError::LengthOverrun {
                declared: 5,
                available: 1,
                offset: 2
            }
        );
    }

    #[test]
    fn test_dangling_escape_is_fatal() {
        let err = deframe_byte_stuffing(&[FLAG, b'a', ESC]).unwrap_err();
        assert_eq!(err, FramingError::DanglingEscape { offset: 2 });
    }

    #[test]
    fn test_max_frame_size_must_fit_header() {
        assert_eq!(
            frame_character_count(b"x", 256).unwrap_err(),
            FramingError::InvalidMaxFrameSize(256)
        );
        assert!(frame_byte_stuffing(b"x", 0).is_err());

        let payload = vec![7u8; 600];
        let framed = frame_character_count(&payload, 255).unwrap();
        assert_eq!(framed[0], 255);
        assert_eq!(deframe_character_count(&framed).unwrap(), payload);
    }
}
