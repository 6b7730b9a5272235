use linksim::config::{CarrierScheme, ErrorControl, FramingMethod, LineCode, SchemeConfig};
use linksim::link::CheckOutcome;
use linksim::transmission::{Receiver, RecordAssembler, Sender, SenderConfig, WireRecord, chunks};
use linksim::utils::consts::WIRE_CHUNK_SIZE;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn sender(scheme: SchemeConfig, error_per_mille: u32) -> Sender {
    Sender::new(SenderConfig {
        scheme,
        error_per_mille,
    })
    .unwrap()
}

#[test]
fn sender_to_receiver_over_chunked_transport() {
    let message = "A message long enough to need several transport chunks.";
    for carrier in [
        CarrierScheme::Ask {
            amp_zero: 0.5,
            amp_one: 2.0,
        },
        CarrierScheme::Fsk {
            freq_zero: 1.0,
            freq_one: 3.0,
        },
        CarrierScheme::Qam8,
    ] {
        let scheme = SchemeConfig {
            carrier,
            line_code: LineCode::Manchester,
            framing: FramingMethod::ByteStuffing,
            error_control: ErrorControl::Crc32,
            ..SchemeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2024);
        let (_, record) = sender(scheme.clone(), 0).send(message, &mut rng).unwrap();

        let pieces = chunks(&record.render());
        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.len() <= WIRE_CHUNK_SIZE));

        let mut assembler = RecordAssembler::new();
        let assembled = pieces
            .iter()
            .find_map(|piece| assembler.push(piece))
            .unwrap();

        let reception = Receiver::new().receive(&assembled).unwrap();
        assert_eq!(reception.decoded.text, message, "{carrier}");
        assert!(!reception.decoded.error_detected);
        assert_eq!(reception.record.config.carrier, carrier);
        assert_eq!(reception.record.config.line_code, scheme.line_code);
        match carrier {
            CarrierScheme::Qam8 => assert_eq!(reception.hint_matches, Some(true)),
            _ => assert_eq!(reception.hint_matches, None),
        }
    }
}

#[test]
fn channel_errors_reach_the_receiver() {
    let scheme = SchemeConfig {
        sample_count: 8,
        error_control: ErrorControl::Parity,
        ..SchemeConfig::default()
    };
    // an odd number of flips in ~70 bits is common at 1%, so sweep seeds
    let mut flagged = 0;
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (tx, record) = sender(scheme.clone(), 10).send("parity!", &mut rng).unwrap();
        let Ok(reception) = Receiver::new().receive(&record.render()) else {
            continue;
        };
        if tx.flipped_bits() % 2 == 1 {
            assert!(reception.decoded.error_detected, "seed {seed}");
            assert!(matches!(
                reception.decoded.outcome,
                CheckOutcome::ChecksumMismatch { .. }
            ));
            flagged += 1;
        }
    }
    assert!(flagged > 0);
}

#[test]
fn record_parse_keeps_scheme_labels() {
    let scheme = SchemeConfig {
        sample_count: 10,
        amplitude: 2.5,
        frequency: 3.0,
        phase: 0.25,
        line_code: LineCode::Bipolar,
        carrier: CarrierScheme::Qam8,
        framing: FramingMethod::ByteStuffing,
        error_control: ErrorControl::Hamming,
        ..SchemeConfig::default()
    };
    let record = WireRecord::new(scheme.clone(), &[1, 0, -1, 0], vec![0.1, -0.2]);
    let text = record.render();
    assert!(text.starts_with("10|2.5|3.0|0.25|Bipolar|8-QAM, 1; 0; -1; 0|Byte Stuffing|Hamming|"));
    assert_eq!(WireRecord::parse(&text).unwrap().config, scheme);
}
