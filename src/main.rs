use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};

use linksim::config::{CarrierScheme, ErrorControl, FramingMethod, LineCode, SchemeConfig};
use linksim::error::Result;
use linksim::pipeline::decode_message;
use linksim::simulate::{SimulationConfig, simulate};
use linksim::transmission::{Receiver, Sender, SenderConfig, TextComparison};
use linksim::utils::consts::{DEFAULT_SIMULATION_WORKERS, WAV_SAMPLE_RATE};
use linksim::utils::dump::{SignalDump, read_wav, write_to_wav};
use linksim::utils::logging::init_logging;
use linksim::utils::progress::{ProgressManager, templates};

#[derive(Parser)]
#[command(author, version, about = "Two-layer link simulator", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Scheme selection. Flags override values loaded from `--config`.
#[derive(Args, Debug)]
struct SchemeArgs {
    /// JSON file with a scheme configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sample_count: Option<usize>,
    #[arg(long)]
    amplitude: Option<f64>,
    #[arg(long)]
    frequency: Option<f64>,
    #[arg(long)]
    phase: Option<f64>,
    /// NRZ-Polar, Manchester or Bipolar
    #[arg(long)]
    line_code: Option<LineCode>,
    /// ASK, FSK or 8-QAM
    #[arg(long)]
    carrier: Option<CarrierScheme>,
    #[arg(long)]
    amp_zero: Option<f64>,
    #[arg(long)]
    amp_one: Option<f64>,
    #[arg(long)]
    freq_zero: Option<f64>,
    #[arg(long)]
    freq_one: Option<f64>,
    /// "Character Count" or "Byte Stuffing"
    #[arg(long)]
    framing: Option<FramingMethod>,
    /// None, Parity, CRC-32 or Hamming
    #[arg(long)]
    error_control: Option<ErrorControl>,
    #[arg(long)]
    max_frame_size: Option<usize>,
}

impl SchemeArgs {
    fn resolve(&self) -> Result<SchemeConfig> {
        let mut config = match &self.config {
            Some(path) => SchemeConfig::from_json_file(path)?,
            None => SchemeConfig::default(),
        };

        if let Some(v) = self.sample_count {
            config.sample_count = v;
        }
        if let Some(v) = self.amplitude {
            config.amplitude = v;
        }
        if let Some(v) = self.frequency {
            config.frequency = v;
        }
        if let Some(v) = self.phase {
            config.phase = v;
        }
        if let Some(v) = self.line_code {
            config.line_code = v;
        }
        if let Some(v) = self.carrier {
            config.carrier = v;
        }
        if let Some(v) = self.framing {
            config.framing = v;
        }
        if let Some(v) = self.error_control {
            config.error_control = v;
        }
        if let Some(v) = self.max_frame_size {
            config.max_frame_size = v;
        }
        match &mut config.carrier {
            CarrierScheme::Ask { amp_zero, amp_one } => {
                *amp_zero = self.amp_zero.unwrap_or(*amp_zero);
                *amp_one = self.amp_one.unwrap_or(*amp_one);
            }
            CarrierScheme::Fsk {
                freq_zero,
                freq_one,
            } => {
                *freq_zero = self.freq_zero.unwrap_or(*freq_zero);
                *freq_one = self.freq_one.unwrap_or(*freq_one);
            }
            CarrierScheme::Qam8 => {}
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text and write the wire record
    Send {
        /// Text to send; read from --input when absent
        #[arg(short, long)]
        text: Option<String>,
        /// Text file, "-" for stdin
        #[arg(short, long)]
        input: Option<String>,
        /// Record destination, "-" or absent for stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Channel bit error probability, per thousand bits
        #[arg(short, long, default_value_t = 0)]
        error_rate: u32,
        #[arg(long)]
        seed: Option<u64>,
        /// Dump bits and signals as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Export the sent analog signal as WAV
        #[arg(long)]
        wav: Option<PathBuf>,
        #[command(flatten)]
        scheme: SchemeArgs,
    },
    /// Read a wire record and decode it
    Recv {
        /// Record source, "-" or absent for stdin
        #[arg(short, long)]
        input: Option<String>,
        /// Decoded text destination, "-" or absent for stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Compare the decoded text against this
        #[arg(long)]
        expect: Option<String>,
    },
    /// Decode samples from a WAV file with the given scheme
    Decode {
        wav: PathBuf,
        #[command(flatten)]
        scheme: SchemeArgs,
    },
    /// Run many independent noisy transmissions and tally the outcomes
    Simulate {
        #[arg(short, long)]
        text: String,
        #[arg(short, long, default_value_t = 10)]
        error_rate: u32,
        #[arg(short, long, default_value_t = 100)]
        runs: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long, default_value_t = DEFAULT_SIMULATION_WORKERS)]
        workers: usize,
        /// Write every run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        #[command(flatten)]
        scheme: SchemeArgs,
    },
}

fn open_input(path: Option<&str>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) if path == "-" => Box::new(io::stdin()),
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin()),
    })
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) if path == "-" => Box::new(io::stdout()),
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Send {
            text,
            input,
            output,
            error_rate,
            seed,
            json,
            wav,
            scheme,
        } => {
            let sender = Sender::new(SenderConfig {
                scheme: scheme.resolve()?,
                error_per_mille: error_rate,
            })?;
            let scheme = &sender.config().scheme;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    open_input(input.as_deref())?.read_to_string(&mut buf)?;
                    buf.trim_end().to_string()
                }
            };
            info!(
                "Scheme: {} / {} / {} / {}",
                scheme.line_code, scheme.carrier, scheme.framing, scheme.error_control
            );

            let mut rng = rng_from(seed);
            let (transmission, record) = sender.send(&text, &mut rng)?;

            let mut dst = open_output(output.as_deref())?;
            Sender::write_record(&record, dst.as_mut())?;

            if let Some(path) = json {
                SignalDump::new(&text, scheme, &transmission).write_json(&path)?;
            }
            if let Some(path) = wav {
                write_to_wav(&transmission.sent_analog, WAV_SAMPLE_RATE, &path)?;
            }
        }
        Commands::Recv {
            input,
            output,
            expect,
        } => {
            let mut src = open_input(input.as_deref())?;
            let reception = Receiver::new().receive_from(src.as_mut())?;

            let mut dst = open_output(output.as_deref())?;
            writeln!(dst, "{}", reception.decoded.text)?;
            dst.flush()?;
            eprintln!(
                "error detected: {} ({:?})",
                reception.decoded.error_detected, reception.decoded.outcome
            );

            if let Some(expected) = expect {
                TextComparison::new(&expected, &reception.decoded.text).log();
            }
        }
        Commands::Decode { wav, scheme } => {
            let scheme = scheme.resolve()?;
            let samples = read_wav(&wav)?;
            let decoded = decode_message(&samples, &scheme)?;
            println!("{}", decoded.text);
            eprintln!(
                "error detected: {} ({:?})",
                decoded.error_detected, decoded.outcome
            );
        }
        Commands::Simulate {
            text,
            error_rate,
            runs,
            seed,
            workers,
            report,
            scheme,
        } => {
            let config = SimulationConfig {
                scheme: scheme.resolve()?,
                error_per_mille: error_rate,
                runs,
                seed,
                workers,
            };

            let progress = ProgressManager::new();
            if let Err(e) =
                progress.create_bar("simulate", runs as u64, templates::SIMULATE, "running")
            {
                warn!("No progress bar: {}", e);
            }
            let result = simulate(&text, &config, |report| {
                if progress.exists("simulate") {
                    let _ = progress.inc("simulate", 1);
                    let _ = progress.set_message("simulate", &format!("run {}", report.run));
                }
            });
            let _ = match result {
                Ok(_) => progress.finish("simulate", "done"),
                Err(_) => progress.finish_and_clear("simulate"),
            };
            let (summary, reports) = result?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(path) = report {
                let writer = BufWriter::new(File::create(&path)?);
                serde_json::to_writer_pretty(writer, &reports)?;
                info!("Run reports written to {}", path.display());
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
