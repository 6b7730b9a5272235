use crate::bits::BitStream;
use crate::config::LineCode;

use super::DigitalSignal;

/// Bit <-> symbol-level mapping without a carrier
pub trait LineCoder {
    fn encode(&self, bits: &[bool]) -> DigitalSignal;
    fn decode(&self, signal: &[i8]) -> BitStream;
    /// Symbols emitted per input bit
    fn symbols_per_bit(&self) -> usize;
}

/// NRZ-Polar: 1 -> +1, 0 -> -1
pub struct NrzPolar;

impl LineCoder for NrzPolar {
    fn encode(&self, bits: &[bool]) -> DigitalSignal {
        bits.iter().map(|&bit| if bit { 1 } else { -1 }).collect()
    }

    fn decode(&self, signal: &[i8]) -> BitStream {
        signal.iter().map(|&level| level > 0).collect()
    }

    fn symbols_per_bit(&self) -> usize {
        1
    }
}

/// Manchester: each bit is XORed with a clock that ticks low then high, giving
/// two slots per bit. 0 -> [0, 1], 1 -> [1, 0]
pub struct Manchester;

impl LineCoder for Manchester {
    fn encode(&self, bits: &[bool]) -> DigitalSignal {
        let mut signal = Vec::with_capacity(bits.len() * 2);
        for &bit in bits {
            for clock in [false, true] {
                signal.push((bit ^ clock) as i8);
            }
        }
        signal
    }

    /// The first slot of each pair carries the bit itself
    fn decode(&self, signal: &[i8]) -> BitStream {
        signal.chunks(2).map(|pair| pair[0] == 1).collect()
    }

    fn symbols_per_bit(&self) -> usize {
        2
    }
}

/// Bipolar AMI: 0 -> 0, successive 1s alternate +1, -1, +1, ...
pub struct Bipolar;

impl Bipolar {
    /// Re-create alternating marks from a mark/space decision sequence
    pub fn marks(ones: impl IntoIterator<Item = bool>) -> DigitalSignal {
        let mut last_mark: i8 = -1;
        ones.into_iter()
            .map(|one| {
                if one {
                    last_mark = -last_mark;
                    last_mark
                } else {
                    0
                }
            })
            .collect()
    }
}

impl LineCoder for Bipolar {
    fn encode(&self, bits: &[bool]) -> DigitalSignal {
        Self::marks(bits.iter().copied())
    }

    fn decode(&self, signal: &[i8]) -> BitStream {
        signal.iter().map(|&level| level != 0).collect()
    }

    fn symbols_per_bit(&self) -> usize {
        1
    }
}

impl LineCode {
    pub fn coder(self) -> Box<dyn LineCoder> {
        match self {
            LineCode::NrzPolar => Box::new(NrzPolar),
            LineCode::Manchester => Box::new(Manchester),
            LineCode::Bipolar => Box::new(Bipolar),
        }
    }

    /// Whether a symbol level stands for a logical 1 on the carrier.
    /// NRZ-Polar uses -1 for zero; the other codes mark a one with any non-zero level.
    pub fn is_mark(self, level: i8) -> bool {
        match self {
            LineCode::NrzPolar => level == 1,
            LineCode::Manchester | LineCode::Bipolar => level != 0,
        }
    }

    /// Inverse of [`LineCode::is_mark`]: rebuild this code's symbol alphabet
    /// from mark/space decisions.
    pub fn levels_from_marks(self, marks: impl IntoIterator<Item = bool>) -> DigitalSignal {
        match self {
            LineCode::NrzPolar => marks.into_iter().map(|m| if m { 1 } else { -1 }).collect(),
            LineCode::Manchester => marks.into_iter().map(|m| m as i8).collect(),
            LineCode::Bipolar => Bipolar::marks(marks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITS: [bool; 8] = [false, true, false, false, true, false, false, true];

    #[test]
    fn test_nrz_polar() {
        let signal = NrzPolar.encode(&BITS);
        assert_eq!(signal, vec![-1, 1, -1, -1, 1, -1, -1, 1]);
        assert_eq!(NrzPolar.decode(&signal), BITS);
    }

    #[test]
    fn test_bipolar_alternates_marks() {
        let signal = Bipolar.encode(&BITS);
        assert_eq!(signal, vec![0, 1, 0, 0, -1, 0, 0, 1]);
        assert_eq!(Bipolar.decode(&signal), BITS);
    }

    #[test]
    fn test_manchester_encoding_decoding() {
        let signal = Manchester.encode(&[false, true, true]);
        assert_eq!(signal, vec![0, 1, 1, 0, 1, 0]);

        let signal = Manchester.encode(&BITS);
        assert_eq!(signal.len(), BITS.len() * 2);
        assert_eq!(Manchester.decode(&signal), BITS);
    }

    #[test]
    fn test_marks_round_trip_per_code() {
        for code in LineCode::ALL {
            let signal = code.coder().encode(&BITS);
            let marks: Vec<bool> = signal.iter().map(|&level| code.is_mark(level)).collect();
            assert_eq!(code.levels_from_marks(marks), signal, "{code}");
        }
    }
}
