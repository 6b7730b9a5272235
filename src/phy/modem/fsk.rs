//! FSK (Frequency Shift Keying) modulation and demodulation

use std::f64::consts::PI;

use tracing::trace;

use super::{CarrierModem, nearer_to_one, window_time};
use crate::config::LineCode;
use crate::phy::{AnalogSignal, DigitalSignal};

pub struct FskModem {
    sample_count: usize,
    amplitude: f64,
    phase: f64,
    freq_zero: f64,
    freq_one: f64,
    line_code: LineCode,
}

impl FskModem {
    pub fn new(
        sample_count: usize,
        amplitude: f64,
        phase: f64,
        freq_zero: f64,
        freq_one: f64,
        line_code: LineCode,
    ) -> Self {
        Self {
            sample_count,
            amplitude,
            phase,
            freq_zero,
            freq_one,
            line_code,
        }
    }

    /// Sign changes across the window, counting the wrap from the last sample
    /// back to the first. A window holding `f` whole cycles yields `2f`.
    pub fn zero_crossings(window: &[f64]) -> usize {
        let Some(&last) = window.last() else {
            return 0;
        };
        let mut previous = last >= 0.0;
        let mut crossings = 0;
        for &sample in window {
            let positive = sample >= 0.0;
            if positive != previous {
                crossings += 1;
            }
            previous = positive;
        }
        crossings
    }

    /// Frequency estimate in cycles per symbol window
    fn estimate_frequency(window: &[f64]) -> f64 {
        Self::zero_crossings(window) as f64 / 2.0
    }
}

impl CarrierModem for FskModem {
    fn modulate(&self, signal: &[i8]) -> AnalogSignal {
        let mut samples = Vec::with_capacity(self.samples_for_symbols(signal.len()));
        for &level in signal {
            let frequency = if self.line_code.is_mark(level) {
                self.freq_one
            } else {
                self.freq_zero
            };
            samples.extend((0..self.sample_count).map(|j| {
                let t = window_time(j, self.sample_count);
                self.amplitude * (2.0 * PI * frequency * t + self.phase).sin()
            }));
        }
        samples
    }

    fn demodulate(&self, samples: &[f64]) -> DigitalSignal {
        let zero = self.freq_zero.abs();
        let one = self.freq_one.abs();

        let marks = samples.chunks(self.sample_count).map(|window| {
            let frequency = Self::estimate_frequency(window);
            trace!("FSK window frequency {:.2}", frequency);
            nearer_to_one(frequency, zero, one)
        });
        self.line_code.levels_from_marks(marks)
    }

    fn samples_for_symbols(&self, symbols: usize) -> usize {
        symbols * self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fsk_modulation() {
        let modem = FskModem::new(50, 1.0, 0.0, 1.0, 2.0, LineCode::NrzPolar);
        let signal = vec![-1, 1, -1, 1];
        let samples = modem.modulate(&signal);

        assert_eq!(samples.len(), signal.len() * 50);
        for sample in &samples {
            assert!(sample.abs() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_zero_crossings_count_whole_cycles() {
        for f in 1..5 {
            let window: Vec<f64> = (0..64)
                .map(|j| (2.0 * PI * f as f64 * j as f64 / 64.0).sin())
                .collect();
            assert_eq!(FskModem::zero_crossings(&window), 2 * f);
        }
        assert_eq!(FskModem::zero_crossings(&[0.0; 8]), 0);
        assert_eq!(FskModem::zero_crossings(&[]), 0);
    }

    #[test]
    fn test_fsk_demodulation() {
        let cases: [(LineCode, Vec<i8>); 3] = [
            (LineCode::NrzPolar, vec![-1, 1, 1, -1, 1]),
            (LineCode::Bipolar, vec![0, 1, 0, -1, 1]),
            (LineCode::Manchester, vec![1, 0, 0, 1]),
        ];
        for (code, signal) in cases {
            let modem = FskModem::new(40, 1.0, 0.3, 1.0, 3.0, code);
            let samples = modem.modulate(&signal);
            assert_eq!(modem.demodulate(&samples), signal, "{code}");
        }
    }

    #[test]
    fn test_zero_frequency_reads_as_space() {
        let modem = FskModem::new(20, 1.0, 0.0, 0.0, 1.0, LineCode::Manchester);
        let signal = vec![0, 1, 1, 0];
        let samples = modem.modulate(&signal);
        assert_eq!(modem.demodulate(&samples), signal);
    }
}
