//! End-to-end pipeline: text -> frames -> codeword -> symbol levels -> samples, and back.
//!
//! Every stage consumes the complete output of the one before it. The
//! configuration is only borrowed, so independent runs can share it read-only.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bits::{BitStream, bytes_to_text, text_to_bytes};
use crate::channel::apply_bit_errors;
use crate::config::{CarrierScheme, SchemeConfig};
use crate::error::Result;
use crate::link::CheckOutcome;
use crate::phy::modem::{Qam8Modem, modem_for};
use crate::phy::{AnalogSignal, DigitalSignal};

/// Everything one send produces.
///
/// The display copies are what the sender plots locally; the sent copies went
/// through the simulated channel and are what the receiver gets.
#[derive(Debug, Clone, Serialize)]
pub struct Transmission {
    /// Encoded bits before the channel
    pub bits: BitStream,
    pub display_digital: DigitalSignal,
    pub display_analog: AnalogSignal,
    /// Encoded bits after the channel
    pub sent_bits: BitStream,
    pub sent_digital: DigitalSignal,
    pub sent_analog: AnalogSignal,
}

impl Transmission {
    pub fn flipped_bits(&self) -> usize {
        crate::channel::hamming_distance(&self.bits, &self.sent_bits)
    }
}

/// What the receiver recovers from one signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    pub text: String,
    pub error_detected: bool,
    pub outcome: CheckOutcome,
    /// Symbol levels the text was decoded from
    pub digital: DigitalSignal,
}

/// Link-layer half of the sender: text to the bit stream handed to the line coder.
pub fn encode_bits(text: &str, config: &SchemeConfig) -> Result<BitStream> {
    config.validate()?;

    let payload = text_to_bytes(text)?;
    let framed = config.framing.frame(&payload, config.max_frame_size)?;
    let bits = config.error_control.encode(&framed);

    debug!(
        "Link encode: {} chars -> {} framed bytes -> {} bits",
        payload.len(),
        framed.len(),
        bits.len()
    );
    Ok(bits)
}

/// Physical-layer half of the sender.
pub fn modulate_bits(bits: &[bool], config: &SchemeConfig) -> (DigitalSignal, AnalogSignal) {
    let digital = config.line_code.coder().encode(bits);
    let analog = modem_for(config).modulate(&digital);
    debug!(
        "Phy encode: {} bits -> {} {} symbols -> {} {} samples",
        bits.len(),
        digital.len(),
        config.line_code,
        analog.len(),
        config.carrier
    );
    (digital, analog)
}

pub fn encode_message(text: &str, config: &SchemeConfig) -> Result<AnalogSignal> {
    let bits = encode_bits(text, config)?;
    let (_, analog) = modulate_bits(&bits, config);
    Ok(analog)
}

/// Encode `text` and push a copy through a channel that flips each encoded bit
/// with probability `per_mille / 1000`.
pub fn transmit<R: Rng + ?Sized>(
    text: &str,
    config: &SchemeConfig,
    per_mille: u32,
    rng: &mut R,
) -> Result<Transmission> {
    info!("Text to transmit: {:?}", text);

    let bits = encode_bits(text, config)?;
    let (display_digital, display_analog) = modulate_bits(&bits, config);

    let sent_bits = apply_bit_errors(&bits, per_mille, rng)?;
    let (sent_digital, sent_analog) = if sent_bits == bits {
        (display_digital.clone(), display_analog.clone())
    } else {
        modulate_bits(&sent_bits, config)
    };

    let transmission = Transmission {
        bits,
        display_digital,
        display_analog,
        sent_bits,
        sent_digital,
        sent_analog,
    };
    info!(
        "Transmission: {} bits, {} symbols, {} samples, {} bit(s) flipped by channel",
        transmission.bits.len(),
        transmission.sent_digital.len(),
        transmission.sent_analog.len(),
        transmission.flipped_bits()
    );
    Ok(transmission)
}

/// Recover symbol levels from samples, removing 8-QAM's front padding.
pub fn demodulate(samples: &[f64], config: &SchemeConfig) -> DigitalSignal {
    let digital = modem_for(config).demodulate(samples);
    match config.carrier {
        CarrierScheme::Qam8 => {
            let symbols_per_bit = config.line_code.coder().symbols_per_bit();
            let error_control = config.error_control;
            Qam8Modem::unpad(digital, |len| {
                len % symbols_per_bit == 0
                    && error_control.admits_codeword_len(len / symbols_per_bit)
            })
        }
        CarrierScheme::Ask { .. } | CarrierScheme::Fsk { .. } => digital,
    }
}

/// Receiver half starting from symbol levels.
pub fn decode_digital(digital: DigitalSignal, config: &SchemeConfig) -> Result<Decoded> {
    config.validate()?;

    let bits = config.line_code.coder().decode(&digital);
    let checked = config.error_control.decode(&bits)?;
    match checked.outcome {
        CheckOutcome::Clean => {}
        CheckOutcome::Corrected { position } => {
            info!("{}: corrected bit {}", config.error_control, position)
        }
        outcome => warn!("{}: error detected ({:?})", config.error_control, outcome),
    }

    let payload = config.framing.deframe(&checked.payload)?;
    let text = bytes_to_text(&payload);
    debug!(
        "Decode: {} symbols -> {} bits -> {} framed bytes -> {} chars",
        digital.len(),
        bits.len(),
        checked.payload.len(),
        text.len()
    );

    Ok(Decoded {
        text,
        error_detected: checked.outcome.error_detected(),
        outcome: checked.outcome,
        digital,
    })
}

pub fn decode_message(samples: &[f64], config: &SchemeConfig) -> Result<Decoded> {
    config.validate()?;
    let digital = demodulate(samples, config);
    decode_digital(digital, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::bytes_to_bit_string;
    use crate::config::{ErrorControl, FramingMethod, LineCode};
    use crate::error::LinkSimError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn hi_config() -> SchemeConfig {
        SchemeConfig {
            sample_count: 4,
            line_code: LineCode::NrzPolar,
            carrier: CarrierScheme::Ask {
                amp_zero: 0.0,
                amp_one: 1.0,
            },
            framing: FramingMethod::CharacterCount,
            error_control: ErrorControl::None,
            max_frame_size: 4,
            ..SchemeConfig::default()
        }
    }

    #[test]
    fn test_hi_scenario() {
        let config = hi_config();

        let bits = encode_bits("Hi", &config).unwrap();
        let expected = bytes_to_bit_string(&[2, 0x48, 0x69]);
        assert_eq!(crate::bits::bits_to_bit_string(&bits), expected);

        let (digital, analog) = modulate_bits(&bits, &config);
        assert_eq!(digital.len(), 24);
        let expected_levels: Vec<i8> = expected
            .chars()
            .map(|c| if c == '1' { 1 } else { -1 })
            .collect();
        assert_eq!(digital, expected_levels);
        assert_eq!(analog.len(), 96);
        assert_eq!(encode_message("Hi", &config).unwrap(), analog);

        let decoded = decode_message(&analog, &config).unwrap();
        assert_eq!(decoded.text, "Hi");
        assert!(!decoded.error_detected);
    }

    #[test]
    fn test_non_ascii_input_aborts() {
        let err = encode_message("héllo", &hi_config()).unwrap_err();
        assert!(matches!(err, LinkSimError::Encoding { position: 1, .. }));
    }

    #[test]
    fn test_empty_message_round_trips() {
        let config = hi_config();
        let analog = encode_message("", &config).unwrap();
        assert_eq!(analog.len(), 8 * 4);
        assert_eq!(decode_message(&analog, &config).unwrap().text, "");
    }

    #[test]
    fn test_channel_errors_only_touch_sent_copy() {
        let config = SchemeConfig {
            error_control: ErrorControl::Hamming,
            ..hi_config()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let tx = transmit("Hello there", &config, 1000, &mut rng).unwrap();

        assert_eq!(tx.flipped_bits(), tx.bits.len());
        assert_eq!(tx.display_analog, encode_message("Hello there", &config).unwrap());
        assert_ne!(tx.display_analog, tx.sent_analog);
    }

    #[test]
    fn test_single_flip_is_corrected_end_to_end() {
        let config = SchemeConfig {
            error_control: ErrorControl::Hamming,
            line_code: LineCode::Manchester,
            carrier: CarrierScheme::Qam8,
            sample_count: 20,
            ..hi_config()
        };
        let mut bits = encode_bits("link", &config).unwrap();
        bits[5] = !bits[5];
        let (_, analog) = modulate_bits(&bits, &config);

        let decoded = decode_message(&analog, &config).unwrap();
        assert_eq!(decoded.text, "link");
        assert!(decoded.error_detected);
        assert_eq!(decoded.outcome, CheckOutcome::Corrected { position: 6 });
    }

    #[test]
    fn test_crc_flags_a_flipped_bit() {
        let config = SchemeConfig {
            error_control: ErrorControl::Crc32,
            framing: FramingMethod::ByteStuffing,
            ..hi_config()
        };
        let mut bits = encode_bits("abc", &config).unwrap();
        // inside the first payload byte, after the opening FLAG
        bits[9] = !bits[9];
        let (digital, _) = modulate_bits(&bits, &config);

        let decoded = decode_digital(digital, &config).unwrap();
        assert!(decoded.error_detected);
        assert!(matches!(decoded.outcome, CheckOutcome::ChecksumMismatch { .. }));
        assert_ne!(decoded.text, "abc");
    }
}
