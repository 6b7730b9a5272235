//! Carrier modulation: digital symbol levels <-> analog samples.
//!
//! Every scheme uses a local time base of `t = j / sample_count` inside each
//! symbol window, so the carrier frequency is measured in cycles per symbol.

pub mod ask;
pub mod fsk;
pub mod qam;

use crate::config::{CarrierScheme, SchemeConfig};

use super::{AnalogSignal, DigitalSignal};

pub use ask::AskModem;
pub use fsk::FskModem;
pub use qam::Qam8Modem;

pub trait CarrierModem {
    fn modulate(&self, signal: &[i8]) -> AnalogSignal;
    fn demodulate(&self, samples: &[f64]) -> DigitalSignal;
    /// Analog samples produced for `symbols` digital symbols
    fn samples_for_symbols(&self, symbols: usize) -> usize;
}

/// Build the modem selected by the configuration.
pub fn modem_for(config: &SchemeConfig) -> Box<dyn CarrierModem> {
    match config.carrier {
        CarrierScheme::Ask { amp_zero, amp_one } => Box::new(AskModem::new(
            config.sample_count,
            config.frequency,
            config.phase,
            amp_zero,
            amp_one,
            config.line_code,
        )),
        CarrierScheme::Fsk {
            freq_zero,
            freq_one,
        } => Box::new(FskModem::new(
            config.sample_count,
            config.amplitude,
            config.phase,
            freq_zero,
            freq_one,
            config.line_code,
        )),
        CarrierScheme::Qam8 => Box::new(Qam8Modem::new(
            config.sample_count,
            config.frequency,
            config.line_code,
        )),
    }
}

/// Whether one window of every symbol survives modulation and demodulation.
///
/// Windows are synthesized independently, so a configuration passing this
/// decodes any noiseless signal. 8-QAM sees each 3-bit code once.
pub fn separates_symbols(config: &SchemeConfig) -> bool {
    let marks = (0..8u8)
        .flat_map(|code| (0..3).rev().map(move |shift| (code >> shift) & 1 == 1));
    let levels = config.line_code.levels_from_marks(marks);
    let modem = modem_for(config);
    modem.demodulate(&modem.modulate(&levels)) == levels
}

/// Local time of sample `j` within a symbol window
fn window_time(j: usize, sample_count: usize) -> f64 {
    j as f64 / sample_count as f64
}

/// Pick whichever reference is nearer to `value`. Ties go to `zero`.
fn nearer_to_one(value: f64, zero: f64, one: f64) -> bool {
    (value - one).abs() < (value - zero).abs()
}
