/// Receiver endpoint: reassemble a wire record and decode it
use std::io::Read;

use tracing::{info, warn};

use crate::error::{Result, WireError};
use crate::pipeline::{Decoded, decode_message};
use crate::transmission::wire::{RecordAssembler, WireRecord};
use crate::utils::consts::WIRE_CHUNK_SIZE;

/// Result of receiving one record
#[derive(Debug, Clone)]
pub struct Reception {
    pub record: WireRecord,
    pub decoded: Decoded,
    /// For 8-QAM, whether demodulation agreed with the sender's digital signal
    pub hint_matches: Option<bool>,
}

#[derive(Debug, Default)]
pub struct Receiver;

impl Receiver {
    pub fn new() -> Self {
        Self
    }

    /// Decode a complete record (marker optional)
    pub fn receive(&self, record: &str) -> Result<Reception> {
        let record = WireRecord::parse(record)?;
        let decoded = decode_message(&record.samples, &record.config)?;

        let hint_matches = record.digital_hint.as_ref().map(|hint| {
            let matches = *hint == decoded.digital;
            if !matches {
                warn!(
                    "8-QAM demodulation disagrees with the sender's digital signal ({} vs {} symbols)",
                    decoded.digital.len(),
                    hint.len()
                );
            }
            matches
        });

        info!("=== RECEIVED TEXT ===");
        info!("{}", decoded.text);
        info!("=== END TEXT ===");
        if decoded.error_detected {
            warn!("Error detected: {:?}", decoded.outcome);
        }

        Ok(Reception {
            record,
            decoded,
            hint_matches,
        })
    }

    /// Read chunks from `src` until a whole record has arrived, then decode it
    pub fn receive_from(&self, src: &mut dyn Read) -> Result<Reception> {
        let mut assembler = RecordAssembler::new();
        let mut buf = [0u8; WIRE_CHUNK_SIZE];
        loop {
            let n = src.read(&mut buf)?;
            if n == 0 {
                return Err(WireError::MissingSentinel.into());
            }
            let chunk = String::from_utf8_lossy(&buf[..n]);
            if let Some(record) = assembler.push(&chunk) {
                return self.receive(&record);
            }
        }
    }
}
