//! Text wire record exchanged between sender and receiver.
//!
//! ```text
//! sample|amplitude|frequency|phase|lineCode|carrier[, extra...]|framing|errorControl|s0, s1, ...|END_OF_SEQUENCE
//! ```
//!
//! `extra` is `amp_zero, amp_one` for ASK, `freq_zero, freq_one` for FSK and the
//! `"; "`-joined digital signal for 8-QAM. The record travels in chunks of at most
//! [`WIRE_CHUNK_SIZE`] characters.

use tracing::{debug, trace};

use crate::config::{CarrierScheme, SchemeConfig};
use crate::error::{Result, WireError};
use crate::phy::{AnalogSignal, DigitalSignal};
use crate::utils::consts::{END_OF_SEQUENCE, FIELD_SEPARATOR, WIRE_CHUNK_SIZE};

const FIELD_COUNT: usize = 9;
const LIST_SEPARATOR: &str = ", ";
const HINT_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq)]
pub struct WireRecord {
    /// `max_frame_size` is not carried on the wire and keeps its default
    pub config: SchemeConfig,
    /// Digital signal sent alongside 8-QAM samples
    pub digital_hint: Option<DigitalSignal>,
    pub samples: AnalogSignal,
}

impl WireRecord {
    pub fn new(config: SchemeConfig, digital: &[i8], samples: AnalogSignal) -> Self {
        let digital_hint = match config.carrier {
            CarrierScheme::Qam8 => Some(digital.to_vec()),
            CarrierScheme::Ask { .. } | CarrierScheme::Fsk { .. } => None,
        };
        Self {
            config,
            digital_hint,
            samples,
        }
    }

    fn carrier_field(&self) -> String {
        let label = self.config.carrier.label();
        match self.config.carrier {
            CarrierScheme::Ask { amp_zero, amp_one } => {
                format!("{label}{LIST_SEPARATOR}{amp_zero:?}{LIST_SEPARATOR}{amp_one:?}")
            }
            CarrierScheme::Fsk {
                freq_zero,
                freq_one,
            } => format!("{label}{LIST_SEPARATOR}{freq_zero:?}{LIST_SEPARATOR}{freq_one:?}"),
            CarrierScheme::Qam8 => {
                let hint = self
                    .digital_hint
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|level| level.to_string())
                    .collect::<Vec<_>>()
                    .join(HINT_SEPARATOR);
                format!("{label}{LIST_SEPARATOR}{hint}")
            }
        }
    }

    /// Full record, terminated by the end-of-sequence marker
    pub fn render(&self) -> String {
        let samples = self
            .samples
            .iter()
            .map(|x| format!("{x:?}"))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        let fields = [
            self.config.sample_count.to_string(),
            format!("{:?}", self.config.amplitude),
            format!("{:?}", self.config.frequency),
            format!("{:?}", self.config.phase),
            self.config.line_code.to_string(),
            self.carrier_field(),
            self.config.framing.to_string(),
            self.config.error_control.to_string(),
            samples,
            END_OF_SEQUENCE.to_string(),
        ];
        let record = fields.join(FIELD_SEPARATOR);
        debug!(
            "Rendered wire record: {} chars, {} samples",
            record.len(),
            self.samples.len()
        );
        record
    }

    /// Parse a record. A trailing end-of-sequence marker is optional, so both a
    /// rendered record and the output of [`RecordAssembler`] are accepted.
    pub fn parse(record: &str) -> Result<Self> {
        let body = record.trim_end();
        let body = body
            .strip_suffix(END_OF_SEQUENCE)
            .map(|rest| rest.strip_suffix(FIELD_SEPARATOR).unwrap_or(rest))
            .unwrap_or(body);

        let fields: Vec<&str> = body.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(WireError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            }
            .into());
        }

        let sample_count = fields[0]
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("sample", fields[0]))?;
        let amplitude = parse_f64("amplitude", fields[1])?;
        let frequency = parse_f64("frequency", fields[2])?;
        let phase = parse_f64("phase", fields[3])?;
        let line_code = fields[4].parse()?;
        let (carrier, digital_hint) = parse_carrier(fields[5])?;
        let framing = fields[6].parse()?;
        let error_control = fields[7].parse()?;
        let samples = parse_list(fields[8], LIST_SEPARATOR, |s| parse_f64("samples", s))?;

        let config = SchemeConfig {
            sample_count,
            amplitude,
            frequency,
            phase,
            line_code,
            carrier,
            framing,
            error_control,
            ..SchemeConfig::default()
        };
        debug!(
            "Parsed wire record: {} / {} / {} / {}, {} samples",
            config.line_code,
            config.carrier,
            config.framing,
            config.error_control,
            samples.len()
        );

        Ok(Self {
            config,
            digital_hint,
            samples,
        })
    }
}

fn invalid(field: &'static str, value: &str) -> WireError {
    WireError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}

fn parse_f64(field: &'static str, value: &str) -> std::result::Result<f64, WireError> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

/// Split a list field; an empty field is an empty list
fn parse_list<T>(
    field: &str,
    separator: &str,
    parse: impl Fn(&str) -> std::result::Result<T, WireError>,
) -> std::result::Result<Vec<T>, WireError> {
    if field.trim().is_empty() {
        return Ok(Vec::new());
    }
    field.split(separator.trim()).map(parse).collect()
}

fn parse_carrier(field: &str) -> Result<(CarrierScheme, Option<DigitalSignal>)> {
    let (label, extra) = match field.split_once(',') {
        Some((label, extra)) => (label, Some(extra)),
        None => (field, None),
    };

    match label.parse::<CarrierScheme>()? {
        CarrierScheme::Ask { .. } => {
            let [amp_zero, amp_one] = two_params("ASK", extra)?;
            Ok((CarrierScheme::Ask { amp_zero, amp_one }, None))
        }
        CarrierScheme::Fsk { .. } => {
            let [freq_zero, freq_one] = two_params("FSK", extra)?;
            Ok((
                CarrierScheme::Fsk {
                    freq_zero,
                    freq_one,
                },
                None,
            ))
        }
        CarrierScheme::Qam8 => {
            let hint = parse_list(extra.unwrap_or_default(), HINT_SEPARATOR, |s| {
                s.trim().parse::<i8>().map_err(|_| invalid("8-QAM digital", s))
            })?;
            Ok((CarrierScheme::Qam8, Some(hint)))
        }
    }
}

fn two_params(scheme: &'static str, extra: Option<&str>) -> Result<[f64; 2]> {
    let values = parse_list(extra.unwrap_or_default(), LIST_SEPARATOR, |s| {
        parse_f64("carrier parameter", s)
    })?;
    match values.as_slice() {
        &[a, b] => Ok([a, b]),
        _ => Err(WireError::MissingCarrierParam { scheme }.into()),
    }
}

/// Split a rendered record into transport chunks of at most `WIRE_CHUNK_SIZE` chars.
pub fn chunks(record: &str) -> Vec<String> {
    let chars: Vec<char> = record.chars().collect();
    chars
        .chunks(WIRE_CHUNK_SIZE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Reassembles chunks until the end-of-sequence marker shows up.
///
/// The marker may straddle two chunks, so the whole buffer is searched.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    buffer: String,
    chunks: usize,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Returns the record with the marker stripped once complete.
    pub fn push(&mut self, chunk: &str) -> Option<String> {
        self.buffer.push_str(chunk);
        self.chunks += 1;
        trace!("Chunk {}: {} chars buffered", self.chunks, self.buffer.len());

        let end = self.buffer.find(END_OF_SEQUENCE)?;
        let mut record: String = self.buffer.drain(..end + END_OF_SEQUENCE.len()).collect();
        record.truncate(end);
        if let Some(stripped) = record.strip_suffix(FIELD_SEPARATOR) {
            record.truncate(stripped.len());
        }
        debug!(
            "Record complete after {} chunk(s), {} chars",
            self.chunks, end
        );
        self.chunks = 0;
        Some(record)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
