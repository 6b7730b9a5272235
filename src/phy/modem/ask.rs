//! ASK (Amplitude Shift Keying) modulation and demodulation

use std::f64::consts::PI;

use tracing::trace;

use super::{CarrierModem, nearer_to_one, window_time};
use crate::config::LineCode;
use crate::phy::{AnalogSignal, DigitalSignal};

pub struct AskModem {
    sample_count: usize,
    frequency: f64,
    phase: f64,
    amp_zero: f64,
    amp_one: f64,
    line_code: LineCode,
    /// Largest |sin| the unit carrier reaches at the sampled instants
    reference_peak: f64,
}

impl AskModem {
    pub fn new(
        sample_count: usize,
        frequency: f64,
        phase: f64,
        amp_zero: f64,
        amp_one: f64,
        line_code: LineCode,
    ) -> Self {
        let mut modem = Self {
            sample_count,
            frequency,
            phase,
            amp_zero,
            amp_one,
            line_code,
            reference_peak: 0.0,
        };
        modem.reference_peak = modem
            .carrier(1.0)
            .map(f64::abs)
            .fold(0.0, f64::max);
        modem
    }

    /// One symbol window of the carrier at the given amplitude
    fn carrier(&self, amplitude: f64) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count).map(move |j| {
            let t = window_time(j, self.sample_count);
            amplitude * (2.0 * PI * self.frequency * t + self.phase).sin()
        })
    }

    /// Estimate the amplitude a window was keyed with from its peak
    fn estimate_amplitude(&self, window: &[f64]) -> f64 {
        if self.reference_peak <= f64::EPSILON {
            return 0.0;
        }
        let peak = window.iter().map(|x| x.abs()).fold(0.0, f64::max);
        peak / self.reference_peak
    }
}

impl CarrierModem for AskModem {
    fn modulate(&self, signal: &[i8]) -> AnalogSignal {
        let mut samples = Vec::with_capacity(self.samples_for_symbols(signal.len()));
        for &level in signal {
            let amplitude = if self.line_code.is_mark(level) {
                self.amp_one
            } else {
                self.amp_zero
            };
            samples.extend(self.carrier(amplitude));
        }
        samples
    }

    /// For NRZ-Polar the nearest-amplitude decision is the midpoint threshold
    /// `(amp_zero + amp_one) / 2`; the other codes use the same distance test
    /// and then rebuild their own symbol alphabet.
    fn demodulate(&self, samples: &[f64]) -> DigitalSignal {
        let zero = self.amp_zero.abs();
        let one = self.amp_one.abs();

        let marks = samples.chunks(self.sample_count).map(|window| {
            let amplitude = self.estimate_amplitude(window);
            trace!("ASK window amplitude {:.3}", amplitude);
            nearer_to_one(amplitude, zero, one)
        });
        self.line_code.levels_from_marks(marks)
    }

    fn samples_for_symbols(&self, symbols: usize) -> usize {
        symbols * self.sample_count
    }
}
