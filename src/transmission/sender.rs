/// Sender endpoint: encode text and emit it as a chunked wire record
use std::io::Write;

use rand::Rng;
use tracing::info;

use crate::config::SchemeConfig;
use crate::error::Result;
use crate::pipeline::{Transmission, transmit};
use crate::transmission::wire::{WireRecord, chunks};

/// Configuration for the sender
#[derive(Debug, Clone, Default)]
pub struct SenderConfig {
    pub scheme: SchemeConfig,
    /// Channel bit error probability, per thousand bits
    pub error_per_mille: u32,
}

pub struct Sender {
    config: SenderConfig,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Result<Self> {
        config.scheme.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Run the sender pipeline. The record carries the post-channel signal.
    pub fn send<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<(Transmission, WireRecord)> {
        let transmission = transmit(text, &self.config.scheme, self.config.error_per_mille, rng)?;
        let record = WireRecord::new(
            self.config.scheme.clone(),
            &transmission.sent_digital,
            transmission.sent_analog.clone(),
        );
        Ok((transmission, record))
    }

    /// Write a record to `dst` in transport-sized chunks
    pub fn write_record(record: &WireRecord, dst: &mut dyn Write) -> Result<usize> {
        let pieces = chunks(&record.render());
        for piece in &pieces {
            dst.write_all(piece.as_bytes())?;
        }
        dst.flush()?;
        info!("Wrote wire record in {} chunk(s)", pieces.len());
        Ok(pieces.len())
    }
}
