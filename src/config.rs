//! Scheme selection and numeric parameters for one pipeline run.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinkSimError, Result};
use crate::utils::consts::{
    DEFAULT_AMPLITUDE, DEFAULT_AMP_ONE, DEFAULT_AMP_ZERO, DEFAULT_FREQUENCY, DEFAULT_FREQ_ONE,
    DEFAULT_FREQ_ZERO, DEFAULT_MAX_FRAME_SIZE, DEFAULT_PHASE, DEFAULT_SAMPLE_COUNT,
    MAX_FRAME_SIZE_LIMIT, MAX_SAMPLE_COUNT,
};
use crate::phy::modem::separates_symbols;

/// Digital line code applied to the encoded bit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineCode {
    #[default]
    NrzPolar,
    Manchester,
    Bipolar,
}

/// Carrier modulation, carrying the thresholds its demodulator needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum CarrierScheme {
    Ask { amp_zero: f64, amp_one: f64 },
    Fsk { freq_zero: f64, freq_one: f64 },
    Qam8,
}

impl Default for CarrierScheme {
    fn default() -> Self {
        CarrierScheme::Ask {
            amp_zero: DEFAULT_AMP_ZERO,
            amp_one: DEFAULT_AMP_ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FramingMethod {
    #[default]
    CharacterCount,
    ByteStuffing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorControl {
    #[default]
    None,
    Parity,
    Crc32,
    Hamming,
}

/// Immutable parameter set chosen before a run.
///
/// Every pipeline entry point borrows this; nothing in the crate keeps a global
/// copy, so concurrent runs each own (or share read-only) their configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    /// Samples per symbol interval
    pub sample_count: usize,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub line_code: LineCode,
    pub carrier: CarrierScheme,
    pub framing: FramingMethod,
    pub error_control: ErrorControl,
    /// Largest payload per frame, in bytes
    pub max_frame_size: usize,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            amplitude: DEFAULT_AMPLITUDE,
            frequency: DEFAULT_FREQUENCY,
            phase: DEFAULT_PHASE,
            line_code: LineCode::default(),
            carrier: CarrierScheme::default(),
            framing: FramingMethod::default(),
            error_control: ErrorControl::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl SchemeConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SchemeConfig = serde_json::from_str(&text)?;
        debug!("Loaded scheme config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 || self.sample_count > MAX_SAMPLE_COUNT {
            return Err(LinkSimError::Config(format!(
                "sample_count {} outside 1..={}",
                self.sample_count, MAX_SAMPLE_COUNT
            )));
        }
        if self.max_frame_size == 0 || self.max_frame_size > MAX_FRAME_SIZE_LIMIT {
            return Err(LinkSimError::Config(format!(
                "max_frame_size {} outside 1..={}",
                self.max_frame_size, MAX_FRAME_SIZE_LIMIT
            )));
        }

        let mut numbers = vec![
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("phase", self.phase),
        ];
        match self.carrier {
            CarrierScheme::Ask { amp_zero, amp_one } => {
                numbers.push(("amp_zero", amp_zero));
                numbers.push(("amp_one", amp_one));
            }
            CarrierScheme::Fsk {
                freq_zero,
                freq_one,
            } => {
                numbers.push(("freq_zero", freq_zero));
                numbers.push(("freq_one", freq_one));
            }
            CarrierScheme::Qam8 => {}
        }
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LinkSimError::Config(format!("{name} is not finite: {value}")));
        }

        // The demodulators classify by magnitude, so the two symbols must differ there
        match self.carrier {
            CarrierScheme::Ask { amp_zero, amp_one } if amp_zero.abs() == amp_one.abs() => {
                return Err(LinkSimError::Config(format!(
                    "ASK amplitudes {amp_zero} and {amp_one} are indistinguishable"
                )));
            }
            CarrierScheme::Fsk {
                freq_zero,
                freq_one,
            } if freq_zero.abs() == freq_one.abs() => {
                return Err(LinkSimError::Config(format!(
                    "FSK frequencies {freq_zero} and {freq_one} are indistinguishable"
                )));
            }
            CarrierScheme::Qam8 if self.frequency == 0.0 => {
                return Err(LinkSimError::Config(
                    "8-QAM needs a non-zero carrier frequency".into(),
                ));
            }
            _ => {}
        }

        let highest = match self.carrier {
            CarrierScheme::Fsk {
                freq_zero,
                freq_one,
            } => freq_zero.abs().max(freq_one.abs()),
            _ => self.frequency.abs(),
        };
        if self.sample_count as f64 <= 2.0 * highest {
            return Err(LinkSimError::Config(format!(
                "{} samples per symbol cannot carry {} cycles per symbol",
                self.sample_count, highest
            )));
        }
        if !separates_symbols(self) {
            return Err(LinkSimError::Config(format!(
                "{} symbols are indistinguishable at {} samples per symbol",
                self.carrier, self.sample_count
            )));
        }

        Ok(())
    }
}

impl LineCode {
    pub const ALL: [LineCode; 3] = [LineCode::NrzPolar, LineCode::Manchester, LineCode::Bipolar];

    pub fn label(self) -> &'static str {
        match self {
            LineCode::NrzPolar => "NRZ-Polar",
            LineCode::Manchester => "Manchester",
            LineCode::Bipolar => "Bipolar",
        }
    }
}

impl CarrierScheme {
    pub fn label(&self) -> &'static str {
        match self {
            CarrierScheme::Ask { .. } => "ASK",
            CarrierScheme::Fsk { .. } => "FSK",
            CarrierScheme::Qam8 => "8-QAM",
        }
    }
}

impl FramingMethod {
    pub const ALL: [FramingMethod; 2] = [FramingMethod::CharacterCount, FramingMethod::ByteStuffing];

    pub fn label(self) -> &'static str {
        match self {
            FramingMethod::CharacterCount => "Character Count",
            FramingMethod::ByteStuffing => "Byte Stuffing",
        }
    }
}

impl ErrorControl {
    pub const ALL: [ErrorControl; 4] = [
        ErrorControl::None,
        ErrorControl::Parity,
        ErrorControl::Crc32,
        ErrorControl::Hamming,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ErrorControl::None => "None",
            ErrorControl::Parity => "Parity",
            ErrorControl::Crc32 => "CRC-32",
            ErrorControl::Hamming => "Hamming",
        }
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for CarrierScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FramingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ErrorControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn unsupported(axis: &'static str, value: &str) -> LinkSimError {
    LinkSimError::UnsupportedScheme {
        axis,
        value: value.to_string(),
    }
}

impl FromStr for LineCode {
    type Err = LinkSimError;

    fn from_str(s: &str) -> Result<Self> {
        LineCode::ALL
            .into_iter()
            .find(|code| code.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| unsupported("line code", s))
    }
}

impl FromStr for CarrierScheme {
    type Err = LinkSimError;

    /// Parses the label only; ASK and FSK get their default thresholds.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASK" => Ok(CarrierScheme::default()),
            "FSK" => Ok(CarrierScheme::Fsk {
                freq_zero: DEFAULT_FREQ_ZERO,
                freq_one: DEFAULT_FREQ_ONE,
            }),
            "8-QAM" | "QAM8" => Ok(CarrierScheme::Qam8),
            _ => Err(unsupported("carrier scheme", s)),
        }
    }
}

impl FromStr for FramingMethod {
    type Err = LinkSimError;

    fn from_str(s: &str) -> Result<Self> {
        FramingMethod::ALL
            .into_iter()
            .find(|method| method.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| unsupported("framing method", s))
    }
}

impl FromStr for ErrorControl {
    type Err = LinkSimError;

    fn from_str(s: &str) -> Result<Self> {
        ErrorControl::ALL
            .into_iter()
            .find(|method| method.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| unsupported("error control method", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for code in LineCode::ALL {
            assert_eq!(code.label().parse::<LineCode>().unwrap(), code);
        }
        for method in FramingMethod::ALL {
            assert_eq!(method.to_string().parse::<FramingMethod>().unwrap(), method);
        }
        for method in ErrorControl::ALL {
            assert_eq!(method.to_string().parse::<ErrorControl>().unwrap(), method);
        }
        assert_eq!("8-QAM".parse::<CarrierScheme>().unwrap(), CarrierScheme::Qam8);
    }

    #[test]
    fn test_unknown_label_is_unsupported() {
        let err = "Differential Manchester".parse::<LineCode>().unwrap_err();
        assert!(matches!(err, LinkSimError::UnsupportedScheme { axis: "line code", .. }));
        assert!("PSK".parse::<CarrierScheme>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SchemeConfig::default();
        assert!(config.validate().is_ok());

        config.max_frame_size = 256;
        assert!(config.validate().is_err());
        config.max_frame_size = 4;

        config.sample_count = 0;
        assert!(config.validate().is_err());
        config.sample_count = 8;

        config.carrier = CarrierScheme::Fsk {
            freq_zero: f64::NAN,
            freq_one: 2.0,
        };
        assert!(config.validate().is_err());

        config.carrier = CarrierScheme::Ask {
            amp_zero: -1.0,
            amp_one: 1.0,
        };
        assert!(config.validate().is_err());

        config.carrier = CarrierScheme::Qam8;
        assert!(config.validate().is_ok());
        config.frequency = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_undersampled_carriers() {
        let ask = |sample_count| SchemeConfig {
            sample_count,
            ..SchemeConfig::default()
        };
        assert!(ask(1).validate().is_err());
        assert!(ask(2).validate().is_err());
        assert!(ask(3).validate().is_ok());

        let fsk = |sample_count| SchemeConfig {
            sample_count,
            carrier: CarrierScheme::Fsk {
                freq_zero: DEFAULT_FREQ_ZERO,
                freq_one: DEFAULT_FREQ_ONE,
            },
            ..SchemeConfig::default()
        };
        assert!(fsk(3).validate().is_err());
        assert!(fsk(4).validate().is_err());
        assert!(fsk(8).validate().is_ok());

        let qam = |sample_count| SchemeConfig {
            sample_count,
            carrier: CarrierScheme::Qam8,
            ..SchemeConfig::default()
        };
        assert!(qam(2).validate().is_err());
        assert!(qam(8).validate().is_ok());

        assert!(ask(MAX_SAMPLE_COUNT).validate().is_ok());
        assert!(ask(MAX_SAMPLE_COUNT + 1).validate().is_err());
        assert!(ask(1 << 62).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_symbols_the_demodulator_confuses() {
        // carrier sampled only at its zeros
        let silent_ask = SchemeConfig {
            frequency: 0.0,
            phase: 0.0,
            ..SchemeConfig::default()
        };
        assert!(silent_ask.validate().is_err());

        // a constant carrier is still keyed by amplitude
        let dc_ask = SchemeConfig {
            frequency: 0.0,
            phase: std::f64::consts::FRAC_PI_2,
            ..SchemeConfig::default()
        };
        assert!(dc_ask.validate().is_ok());

        let half_cycle_fsk = SchemeConfig {
            carrier: CarrierScheme::Fsk {
                freq_zero: 1.5,
                freq_one: 2.5,
            },
            ..SchemeConfig::default()
        };
        assert!(half_cycle_fsk.validate().is_err());

        let silent_fsk = SchemeConfig {
            amplitude: 0.0,
            carrier: CarrierScheme::Fsk {
                freq_zero: 1.0,
                freq_one: 3.0,
            },
            ..SchemeConfig::default()
        };
        assert!(silent_fsk.validate().is_err());

        // sin reference is zero at every sample, so Q is lost
        let blind_qam = SchemeConfig {
            sample_count: 2,
            frequency: 0.5,
            carrier: CarrierScheme::Qam8,
            ..SchemeConfig::default()
        };
        assert!(blind_qam.validate().is_err());
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let json = r#"{ "line_code": "manchester", "carrier": { "scheme": "fsk", "freq_zero": 1.0, "freq_one": 3.0 } }"#;
        let config: SchemeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.line_code, LineCode::Manchester);
        assert_eq!(
            config.carrier,
            CarrierScheme::Fsk {
                freq_zero: 1.0,
                freq_one: 3.0
            }
        );
        assert_eq!(config.sample_count, DEFAULT_SAMPLE_COUNT);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    }
}
