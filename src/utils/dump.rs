use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bits::bits_to_bit_string;
use crate::config::SchemeConfig;
use crate::error::Result;
use crate::phy::{AnalogSignal, DigitalSignal};
use crate::pipeline::Transmission;

/// Signals of one transmission, for offline plotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDump {
    pub config: SchemeConfig,
    pub text: String,
    pub bits: String,
    pub sent_bits: String,
    pub display_digital: DigitalSignal,
    pub display_analog: AnalogSignal,
    pub sent_digital: DigitalSignal,
    pub sent_analog: AnalogSignal,
}

impl SignalDump {
    pub fn new(text: &str, config: &SchemeConfig, transmission: &Transmission) -> Self {
        Self {
            config: config.clone(),
            text: text.to_string(),
            bits: bits_to_bit_string(&transmission.bits),
            sent_bits: bits_to_bit_string(&transmission.sent_bits),
            display_digital: transmission.display_digital.clone(),
            display_analog: transmission.display_analog.clone(),
            sent_digital: transmission.sent_digital.clone(),
            sent_analog: transmission.sent_analog.clone(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        create_parent(path)?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Signal dump written to {}", path.display());
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

/// Write samples as a mono 32-bit float WAV
pub fn write_to_wav(signal: &[f64], sample_rate: u32, path: &Path) -> Result<()> {
    create_parent(path)?;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in signal {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    info!("{} samples written to {}", signal.len(), path.display());
    Ok(())
}

pub fn read_wav(path: &Path) -> Result<AnalogSignal> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|sample| sample.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let amplitude = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|value| value as f64 / amplitude))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transmit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("linksim-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_json_dump_round_trip() {
        let config = SchemeConfig {
            sample_count: 4,
            ..SchemeConfig::default()
        };
        let tx = transmit("Hi", &config, 0, &mut StdRng::seed_from_u64(0)).unwrap();
        let dump = SignalDump::new("Hi", &config, &tx);
        assert_eq!(dump.bits, "000000100100100001101001");

        let path = temp_path("dump.json");
        dump.write_json(&path).unwrap();
        let read = SignalDump::read_json(&path).unwrap();
        assert_eq!(read.config, dump.config);
        assert_eq!(read.sent_bits, dump.sent_bits);
        assert_eq!(read.display_digital, dump.display_digital);
        assert_eq!(read.sent_analog.len(), dump.sent_analog.len());
        assert!(
            read.sent_analog
                .iter()
                .zip(&dump.sent_analog)
                .all(|(a, b)| (a - b).abs() < 1e-12)
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_wav_round_trip() {
        let signal: Vec<f64> = (0..64).map(|i| (i as f64 / 8.0).sin()).collect();
        let path = temp_path("signal.wav");
        write_to_wav(&signal, 8000, &path).unwrap();
        let read = read_wav(&path).unwrap();
        assert_eq!(read.len(), signal.len());
        assert!(read.iter().zip(&signal).all(|(a, b)| (a - b).abs() < 1e-6));
        let _ = std::fs::remove_file(path);
    }
}
