use linksim::config::{CarrierScheme, ErrorControl, FramingMethod, LineCode, SchemeConfig};
use linksim::link::CheckOutcome;
use linksim::pipeline::{decode_message, encode_bits, encode_message, modulate_bits};
use linksim::utils::consts::{ESC, FLAG};

fn carriers() -> [CarrierScheme; 3] {
    [
        CarrierScheme::Ask {
            amp_zero: 0.0,
            amp_one: 1.0,
        },
        CarrierScheme::Fsk {
            freq_zero: 1.0,
            freq_one: 2.0,
        },
        CarrierScheme::Qam8,
    ]
}

fn every_config(sample_count: usize) -> Vec<SchemeConfig> {
    let mut configs = Vec::new();
    for line_code in LineCode::ALL {
        for carrier in carriers() {
            for framing in FramingMethod::ALL {
                for error_control in ErrorControl::ALL {
                    configs.push(SchemeConfig {
                        sample_count,
                        line_code,
                        carrier,
                        framing,
                        error_control,
                        ..SchemeConfig::default()
                    });
                }
            }
        }
    }
    configs
}

#[test]
fn every_combination_round_trips_without_errors() {
    let flag = FLAG as char;
    let esc = ESC as char;
    let message = format!("Link layer {flag}test{esc} with FLAG/ESC bytes, 0123456789!");

    let configs = every_config(16);
    assert_eq!(configs.len(), 72);
    for config in configs {
        let analog = encode_message(&message, &config).unwrap();
        let decoded = decode_message(&analog, &config)
            .unwrap_or_else(|e| panic!("{config:?}: {e}"));
        assert_eq!(decoded.text, message, "{config:?}");
        assert!(!decoded.error_detected, "{config:?}");
        assert_eq!(decoded.outcome, CheckOutcome::Clean);
    }
}

#[test]
fn short_messages_round_trip_with_default_sample_count() {
    for config in every_config(100) {
        for text in ["", "a", "abcd", "abcde"] {
            let analog = encode_message(text, &config).unwrap();
            let decoded = decode_message(&analog, &config).unwrap();
            assert_eq!(decoded.text, text, "{config:?}");
            assert!(!decoded.error_detected, "{config:?}");
        }
    }
}

#[test]
fn hi_with_character_count_and_ask() {
    let config = SchemeConfig {
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
    };

    let bits = encode_bits("Hi", &config).unwrap();
    let (digital, analog) = modulate_bits(&bits, &config);

    let pattern = "000000100100100001101001";
    let expected: Vec<i8> = pattern
        .chars()
        .map(|c| if c == '1' { 1 } else { -1 })
        .collect();
    assert_eq!(digital, expected);
    assert_eq!(analog.len(), 96);

    let decoded = decode_message(&analog, &config).unwrap();
    assert_eq!(decoded.text, "Hi");
    assert!(!decoded.error_detected);
}

#[test]
fn qam_padding_is_removed_for_every_length() {
    // covers 0, 1 and 2 pad bits across line codes
    for line_code in LineCode::ALL {
        for error_control in ErrorControl::ALL {
            let config = SchemeConfig {
                sample_count: 12,
                line_code,
                carrier: CarrierScheme::Qam8,
                error_control,
                ..SchemeConfig::default()
            };
            for len in 0..9 {
                let text: String = "qamtest!!".chars().take(len).collect();
                let analog = encode_message(&text, &config).unwrap();
                let decoded = decode_message(&analog, &config).unwrap();
                assert_eq!(decoded.text, text, "{config:?} len={len}");
            }
        }
    }
}

#[test]
fn hamming_corrects_one_flip_on_every_carrier() {
    for carrier in carriers() {
        let config = SchemeConfig {
            sample_count: 16,
            carrier,
            error_control: ErrorControl::Hamming,
            ..SchemeConfig::default()
        };
        let clean = encode_bits("fix me", &config).unwrap();
        for i in [0, 7, clean.len() / 2, clean.len() - 1] {
            let mut bits = clean.clone();
            bits[i] = !bits[i];
            let (_, analog) = modulate_bits(&bits, &config);
            let decoded = decode_message(&analog, &config).unwrap();
            assert_eq!(decoded.text, "fix me", "{config:?} flip {i}");
            assert!(decoded.error_detected);
            assert_eq!(decoded.outcome, CheckOutcome::Corrected { position: i + 1 });
        }
    }
}

#[test]
fn broken_length_header_aborts() {
    let config = SchemeConfig {
        sample_count: 8,
        ..SchemeConfig::default()
    };
    let mut bits = encode_bits("abc", &config).unwrap();
    // header 3 -> 131
    bits[0] = true;
    let (_, analog) = modulate_bits(&bits, &config);
    let err = decode_message(&analog, &config).unwrap_err();
    assert!(matches!(err, linksim::LinkSimError::Framing(_)));
}

#[test]
fn undecodable_schemes_are_refused_up_front() {
    let refused = [
        SchemeConfig {
            sample_count: 2,
            ..SchemeConfig::default()
        },
        SchemeConfig {
            frequency: 0.0,
            phase: 0.0,
            ..SchemeConfig::default()
        },
        SchemeConfig {
            sample_count: 4,
            carrier: CarrierScheme::Fsk {
                freq_zero: 1.0,
                freq_one: 2.0,
            },
            ..SchemeConfig::default()
        },
        SchemeConfig {
            carrier: CarrierScheme::Fsk {
                freq_zero: 1.5,
                freq_one: 2.5,
            },
            ..SchemeConfig::default()
        },
        SchemeConfig {
            sample_count: 2,
            carrier: CarrierScheme::Qam8,
            ..SchemeConfig::default()
        },
    ];
    for config in refused {
        let err = encode_message("Hi", &config).unwrap_err();
        assert!(matches!(err, linksim::LinkSimError::Config(_)), "{config:?}");
        assert!(decode_message(&[0.0; 16], &config).is_err(), "{config:?}");
    }
}
