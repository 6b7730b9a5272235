//! Batch of independent transmit/receive runs over a noisy channel.
//!
//! Runs are spread over worker threads. Each worker owns a clone of the scheme
//! and each run seeds its own RNG from the batch seed, so results do not depend
//! on scheduling.

use std::thread;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::channel::PER_MILLE_MAX;
use crate::config::SchemeConfig;
use crate::error::{LinkSimError, Result};
use crate::link::CheckOutcome;
use crate::pipeline::{decode_message, transmit};
use crate::utils::consts::DEFAULT_SIMULATION_WORKERS;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfig {
    pub scheme: SchemeConfig,
    pub error_per_mille: u32,
    pub runs: usize,
    pub seed: u64,
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeConfig::default(),
            error_per_mille: 0,
            runs: 100,
            seed: 0,
            workers: DEFAULT_SIMULATION_WORKERS,
        }
    }
}

/// How one run ended, from the receiver's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunVerdict {
    /// Text arrived intact and nothing was flagged
    Clean,
    /// Hamming corrected the codeword and the text is intact
    Corrected,
    /// The error-control layer flagged the message
    Detected,
    /// Text differs but nothing was flagged
    UndetectedCorruption,
    /// Decoding aborted, e.g. a broken frame header
    Fatal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: usize,
    pub flipped_bits: usize,
    pub verdict: RunVerdict,
    pub outcome: Option<CheckOutcome>,
    pub received: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub runs: usize,
    pub clean: usize,
    pub corrected: usize,
    pub detected: usize,
    pub undetected_corruption: usize,
    pub fatal: usize,
    pub flipped_bits: usize,
}

impl SimulationSummary {
    fn record(&mut self, report: &RunReport) {
        self.runs += 1;
        self.flipped_bits += report.flipped_bits;
        match report.verdict {
            RunVerdict::Clean => self.clean += 1,
            RunVerdict::Corrected => self.corrected += 1,
            RunVerdict::Detected => self.detected += 1,
            RunVerdict::UndetectedCorruption => self.undetected_corruption += 1,
            RunVerdict::Fatal => self.fatal += 1,
        }
    }
}

fn classify(original: &str, received: &str, outcome: CheckOutcome) -> RunVerdict {
    let intact = original == received;
    match outcome {
        CheckOutcome::Clean if intact => RunVerdict::Clean,
        CheckOutcome::Clean => RunVerdict::UndetectedCorruption,
        CheckOutcome::Corrected { .. } if intact => RunVerdict::Corrected,
        _ => RunVerdict::Detected,
    }
}

/// One transmit/receive run with its own seeded RNG
pub fn run_once(text: &str, scheme: &SchemeConfig, error_per_mille: u32, seed: u64, run: usize) -> RunReport {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(run as u64));

    let transmission = match transmit(text, scheme, error_per_mille, &mut rng) {
        Ok(transmission) => transmission,
        Err(e) => {
            return RunReport {
                run,
                flipped_bits: 0,
                verdict: RunVerdict::Fatal,
                outcome: None,
                received: None,
                error: Some(e.to_string()),
            };
        }
    };
    let flipped_bits = transmission.flipped_bits();

    match decode_message(&transmission.sent_analog, scheme) {
        Ok(decoded) => RunReport {
            run,
            flipped_bits,
            verdict: classify(text, &decoded.text, decoded.outcome),
            outcome: Some(decoded.outcome),
            received: Some(decoded.text),
            error: None,
        },
        Err(e) => {
            debug!("Run {} aborted: {}", run, e);
            RunReport {
                run,
                flipped_bits,
                verdict: RunVerdict::Fatal,
                outcome: None,
                received: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run the batch. `on_report` is called on the calling thread as each run
/// finishes, in completion order. Reports are returned sorted by run index.
pub fn simulate(
    text: &str,
    config: &SimulationConfig,
    mut on_report: impl FnMut(&RunReport),
) -> Result<(SimulationSummary, Vec<RunReport>)> {
    config.scheme.validate()?;
    if config.error_per_mille > PER_MILLE_MAX {
        return Err(LinkSimError::Config(format!(
            "bit error probability {}‰ exceeds {}‰",
            config.error_per_mille, PER_MILLE_MAX
        )));
    }
    // Encoding errors are the same for every run
    crate::bits::text_to_bytes(text)?;

    let workers = config.workers.clamp(1, config.runs.max(1));
    info!(
        "Simulating {} run(s) of {} chars on {} worker(s), {}‰ bit errors",
        config.runs,
        text.len(),
        workers,
        config.error_per_mille
    );

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    let (report_tx, report_rx) = crossbeam_channel::unbounded::<RunReport>();
    for run in 0..config.runs {
        // receiver is alive, the send cannot fail
        let _ = job_tx.send(run);
    }
    drop(job_tx);

    let mut reports = Vec::with_capacity(config.runs);
    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let report_tx = report_tx.clone();
            let scheme = config.scheme.clone();
            let (per_mille, seed) = (config.error_per_mille, config.seed);
            scope.spawn(move || {
                let mut done = 0usize;
                while let Ok(run) = job_rx.recv() {
                    let report = run_once(text, &scheme, per_mille, seed, run);
                    if report_tx.send(report).is_err() {
                        break;
                    }
                    done += 1;
                }
                debug!("Worker {} finished {} run(s)", worker, done);
            });
        }
        drop(report_tx);

        while let Ok(report) = report_rx.recv() {
            on_report(&report);
            reports.push(report);
        }
    });

    reports.sort_by_key(|report| report.run);
    let mut summary = SimulationSummary::default();
    for report in &reports {
        summary.record(report);
    }
    info!(
        "Simulation done: {} clean, {} corrected, {} detected, {} undetected, {} fatal",
        summary.clean, summary.corrected, summary.detected, summary.undetected_corruption, summary.fatal
    );
    Ok((summary, reports))
}
