//! 8-QAM modulation and demodulation
//!
//! Symbol levels are reduced to mark/space bits, front-padded with zero bits to a
//! multiple of three and mapped through a fixed 8-point constellation. Each symbol
//! window carries `I·cos(2πft) + Q·sin(2πft)`.

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::{debug, trace, warn};

use super::{CarrierModem, window_time};
use crate::config::LineCode;
use crate::phy::{AnalogSignal, DigitalSignal};

pub const BITS_PER_SYMBOL: usize = 3;

const THIRD: f64 = 1.0 / 3.0;

/// Constellation indexed by the 3-bit code, MSB first
pub const CONSTELLATION: [Complex64; 8] = [
    Complex64::new(1.0, 1.0),       // 000
    Complex64::new(1.0, -1.0),      // 001
    Complex64::new(-1.0, 1.0),      // 010
    Complex64::new(-1.0, -1.0),     // 011
    Complex64::new(THIRD, THIRD),   // 100
    Complex64::new(THIRD, -THIRD),  // 101
    Complex64::new(-THIRD, THIRD),  // 110
    Complex64::new(-THIRD, -THIRD), // 111
];

pub struct Qam8Modem {
    sample_count: usize,
    line_code: LineCode,
    ref_cos: Vec<f64>,
    ref_sin: Vec<f64>,
}

impl Qam8Modem {
    pub fn new(sample_count: usize, frequency: f64, line_code: LineCode) -> Self {
        let (ref_cos, ref_sin): (Vec<f64>, Vec<f64>) = (0..sample_count)
            .map(|j| {
                let phase = 2.0 * PI * frequency * window_time(j, sample_count);
                (phase.cos(), phase.sin())
            })
            .unzip();

        Self {
            sample_count,
            line_code,
            ref_cos,
            ref_sin,
        }
    }

    /// Zero bits added in front of `symbols` levels
    pub fn padding_for(symbols: usize) -> usize {
        (BITS_PER_SYMBOL - symbols % BITS_PER_SYMBOL) % BITS_PER_SYMBOL
    }

    fn symbol_index(bits: &[bool]) -> usize {
        bits.iter().fold(0, |acc, &bit| (acc << 1) | bit as usize)
    }

    fn nearest_symbol(estimate: Complex64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (index, point) in CONSTELLATION.iter().enumerate() {
            let distance = (point - estimate).norm();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }

    fn round_one_decimal(value: f64) -> f64 {
        (value * 10.0).round() / 10.0
    }

    /// Correlate a window with the cos/sin references to recover (I, Q)
    fn estimate_symbol(&self, window: &[f64]) -> Complex64 {
        let n = window.len() as f64;
        let (i_sum, q_sum) = window
            .iter()
            .zip(self.ref_cos.iter().zip(self.ref_sin.iter()))
            .fold((0.0, 0.0), |(i_acc, q_acc), (x, (c, s))| {
                (i_acc + x * c, q_acc + x * s)
            });
        Complex64::new(
            Self::round_one_decimal(2.0 * i_sum / n),
            Self::round_one_decimal(2.0 * q_sum / n),
        )
    }

    /// Drop the front padding from a demodulated signal.
    ///
    /// The demodulator cannot see how many zero bits were prepended, so the
    /// caller supplies `admits`, which says whether an unpadded length is one
    /// the sender could have produced. The longest admissible candidate wins.
    pub fn unpad(mut padded: DigitalSignal, admits: impl Fn(usize) -> bool) -> DigitalSignal {
        let len = padded.len();
        let candidate = (0..BITS_PER_SYMBOL)
            .filter(|&pad| pad <= len)
            .find(|&pad| admits(len - pad));

        match candidate {
            Some(pad) => {
                debug!("8-QAM: removing {} padding symbol(s)", pad);
                padded.drain(..pad);
            }
            None => warn!(
                "8-QAM: no admissible length among {} demodulated symbols, keeping padding",
                len
            ),
        }
        padded
    }
}

impl CarrierModem for Qam8Modem {
    fn modulate(&self, signal: &[i8]) -> AnalogSignal {
        let pad = Self::padding_for(signal.len());
        let bits: Vec<bool> = std::iter::repeat_n(false, pad)
            .chain(signal.iter().map(|&level| self.line_code.is_mark(level)))
            .collect();

        let mut samples = Vec::with_capacity(self.samples_for_symbols(signal.len()));
        for group in bits.chunks(BITS_PER_SYMBOL) {
            let point = CONSTELLATION[Self::symbol_index(group)];
            samples.extend(
                self.ref_cos
                    .iter()
                    .zip(self.ref_sin.iter())
                    .map(|(c, s)| point.re * c + point.im * s),
            );
        }
        samples
    }

    /// Returns the padded signal: three levels per symbol window. See [`Qam8Modem::unpad`].
    fn demodulate(&self, samples: &[f64]) -> DigitalSignal {
        let mut marks = Vec::with_capacity(samples.len() / self.sample_count * BITS_PER_SYMBOL);
        for window in samples.chunks(self.sample_count) {
            let estimate = self.estimate_symbol(window);
            let index = Self::nearest_symbol(estimate);
            trace!("8-QAM estimate {} -> {:03b}", estimate, index);
            for shift in (0..BITS_PER_SYMBOL).rev() {
                marks.push((index >> shift) & 1 == 1);
            }
        }
        self.line_code.levels_from_marks(marks)
    }

    fn samples_for_symbols(&self, symbols: usize) -> usize {
        symbols.div_ceil(BITS_PER_SYMBOL) * self.sample_count
    }
}
